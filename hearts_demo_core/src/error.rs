use crate::card::Card;
use crate::state::{Phase, Seat};
use thiserror::Error;

/// 人类出牌请求被拒绝的原因
///
/// 被拒绝的请求不会改动牌局状态，调用方可以直接忽略。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("当前阶段 {0:?} 不能出牌")]
    NotPlaying(Phase),
    #[error("还没轮到 {seat} (应由 {to_act:?} 出牌)")]
    NotYourTurn { seat: Seat, to_act: Option<Seat> },
    #[error("{0} 由电脑操作")]
    NotHumanSeat(Seat),
    #[error("没有第 {index} 张牌 (手牌共 {hand_len} 张)")]
    NoSuchCard { index: usize, hand_len: usize },
    #[error("{0} 现在不能出")]
    IllegalCard(Card),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("空的牌面")]
    Empty,
    #[error("无法识别的点数: {0}")]
    Rank(String),
    #[error("无法识别的花色: {0}")]
    Suit(String),
}
