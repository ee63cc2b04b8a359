//! 요청 단위 비즈니스 로직.

pub mod ranking;

pub use ranking::rank_stocks;
