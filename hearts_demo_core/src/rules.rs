use crate::card::{count_points, Card, Suit};
use crate::state::{Play, Seat, Trick};

// --- 出牌合法性 ---

/// 判断 `card` 此刻能否从 `hand` 中打出
///
/// - 首攻：红心未破时不能首攻红心，除非手里只剩红心
/// - 跟牌：手里有首张牌的花色就必须跟，没有则任意出
///
/// 纯函数，不检查 `card` 是否在 `hand` 中。
pub fn is_legal(card: Card, hand: &[Card], trick: &Trick, hearts_broken: bool) -> bool {
    match trick.led_suit() {
        None => {
            if card.suit == Suit::Hearts && !hearts_broken {
                return hand.iter().all(|c| c.suit == Suit::Hearts);
            }
            true
        }
        Some(led) => {
            if hand.iter().any(|c| c.suit == led) {
                card.suit == led
            } else {
                true
            }
        }
    }
}

/// 手牌中所有合法的牌，保持手牌原有顺序
pub fn legal_cards(hand: &[Card], trick: &Trick, hearts_broken: bool) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|&c| is_legal(c, hand, trick, hearts_broken))
        .collect()
}

/// 能跟首张花色时只留下该花色，否则整手牌都是候选
pub fn follow_suit_candidates(hand: &[Card], led_suit: Option<Suit>) -> Vec<Card> {
    if let Some(led) = led_suit {
        let following: Vec<Card> = hand.iter().copied().filter(|c| c.suit == led).collect();
        if !following.is_empty() {
            return following;
        }
    }
    hand.to_vec()
}

// --- 结算一墩 ---

/// 一墩牌的结算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrickOutcome {
    pub winner: Seat,
    pub points: u32,
}

/// 结算满四张的一墩：首张花色中点数最大的一家赢，罚分为红心张数加黑桃Q的 13 分
///
/// # Panics
/// 出牌数不是 4 时 panic，说明引擎自身有错误。
pub fn resolve_trick(plays: &[Play]) -> TrickOutcome {
    assert_eq!(plays.len(), Trick::SIZE, "结算的一墩必须正好 4 张牌");

    let led = plays[0].card.suit;
    // 首张牌一定是首攻花色，找不到时退回首家只是兜底
    let winner = plays
        .iter()
        .filter(|p| p.card.suit == led)
        .max_by_key(|p| p.card.rank)
        .map_or(plays[0].seat, |p| p.seat);

    TrickOutcome {
        winner,
        points: count_points(plays.iter().map(|p| p.card)),
    }
}
