//! 电脑玩家的出牌策略
//!
//! 引擎在轮到电脑座位时调用 [`Strategy::choose_card`]。策略只负责从给定的手牌里选牌，
//! 不负责红心首攻的限制：引擎交给策略的手牌和首攻花色必须已经与出牌规则一致。

use crate::card::{Card, Suit, QUEEN_OF_SPADES};
use crate::rules::follow_suit_candidates;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// 从 `hand` 中选一张牌。`led_suit` 为 `None` 表示首攻。
    ///
    /// # Panics
    /// `hand` 为空时 panic。
    fn choose_card(&mut self, hand: &[Card], led_suit: Option<Suit>) -> Card;
}

/// 可通过配置选择的策略种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    LowestCard,
    Random,
    RuleBased,
}

impl StrategyKind {
    pub fn build(self, seed: Option<u64>) -> Box<dyn Strategy> {
        match self {
            StrategyKind::LowestCard => Box::new(LowestCard),
            StrategyKind::Random => Box::new(RandomCard::new(seed)),
            StrategyKind::RuleBased => Box::new(RuleBased),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowest_card" | "lowest" => Ok(StrategyKind::LowestCard),
            "random" => Ok(StrategyKind::Random),
            "rule_based" | "rules" => Ok(StrategyKind::RuleBased),
            other => Err(format!("未知的策略: {other}")),
        }
    }
}

fn candidates(hand: &[Card], led_suit: Option<Suit>) -> Vec<Card> {
    assert!(!hand.is_empty(), "不能从空手牌中选牌");
    follow_suit_candidates(hand, led_suit)
}

/// 点数最小的牌，点数相同时取最先出现的那张
fn lowest(cards: &[Card]) -> Card {
    let mut best = cards[0];
    for &c in &cards[1..] {
        if c.rank < best.rank {
            best = c;
        }
    }
    best
}

/// 点数最大的牌，点数相同时取最先出现的那张
fn highest(cards: &[Card]) -> Card {
    let mut best = cards[0];
    for &c in &cards[1..] {
        if c.rank > best.rank {
            best = c;
        }
    }
    best
}

/// 能跟就跟，出候选中点数最小的牌
#[derive(Debug, Default, Clone, Copy)]
pub struct LowestCard;

impl Strategy for LowestCard {
    fn name(&self) -> &'static str {
        "lowest_card"
    }

    fn choose_card(&mut self, hand: &[Card], led_suit: Option<Suit>) -> Card {
        lowest(&candidates(hand, led_suit))
    }
}

/// 在跟牌候选中均匀随机选择
pub struct RandomCard {
    rng: StdRng,
}

impl RandomCard {
    /// `Some(seed)` 可复现，`None` 使用系统熵
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        RandomCard { rng }
    }
}

impl Strategy for RandomCard {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_card(&mut self, hand: &[Card], led_suit: Option<Suit>) -> Card {
        let options = candidates(hand, led_suit);
        // candidates 非空，choose 不会返回 None
        *options.choose(&mut self.rng).unwrap_or(&options[0])
    }
}

/// 简单规则：跟牌出小，垫牌先丢黑桃Q再丢大红心，首攻避开红心
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBased;

impl Strategy for RuleBased {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn choose_card(&mut self, hand: &[Card], led_suit: Option<Suit>) -> Card {
        let options = candidates(hand, led_suit);
        match led_suit {
            Some(led) if options[0].suit == led => lowest(&options),
            Some(_) => {
                if options.contains(&QUEEN_OF_SPADES) {
                    return QUEEN_OF_SPADES;
                }
                let hearts: Vec<Card> = options.iter().copied().filter(Card::is_heart).collect();
                if hearts.is_empty() {
                    highest(&options)
                } else {
                    highest(&hearts)
                }
            }
            None => {
                let safe: Vec<Card> = options.iter().copied().filter(|c| !c.is_heart()).collect();
                if safe.is_empty() {
                    lowest(&options)
                } else {
                    lowest(&safe)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(list: &str) -> Vec<Card> {
        list.split_whitespace().map(|s| s.parse().unwrap()).collect()
    }

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_lowest_follows_suit() {
        let hand = cards("2C 9D 5D KD");
        assert_eq!(LowestCard.choose_card(&hand, Some(Suit::Diamonds)), card("5D"));
    }

    #[test]
    fn test_lowest_when_void_uses_whole_hand() {
        let hand = cards("9H QS 4D");
        assert_eq!(LowestCard.choose_card(&hand, Some(Suit::Clubs)), card("4D"));
    }

    #[test]
    fn test_lowest_tie_takes_first_in_hand_order() {
        let hand = cards("7S 3H 3C 3D");
        assert_eq!(LowestCard.choose_card(&hand, None), card("3H"));
    }

    #[test]
    fn test_lowest_may_lead_hearts() {
        // 策略本身不检查红心首攻限制
        let hand = cards("2H 5C");
        assert_eq!(LowestCard.choose_card(&hand, None), card("2H"));
    }

    #[test]
    #[should_panic]
    fn test_empty_hand_panics() {
        LowestCard.choose_card(&[], None);
    }

    #[test]
    fn test_random_is_reproducible_and_follows_suit() {
        let hand = cards("2C 9D 5D KD AS 3H");
        let mut a = RandomCard::new(Some(7));
        let mut b = RandomCard::new(Some(7));
        for _ in 0..20 {
            let x = a.choose_card(&hand, Some(Suit::Diamonds));
            assert_eq!(x, b.choose_card(&hand, Some(Suit::Diamonds)));
            assert_eq!(x.suit, Suit::Diamonds);
        }
    }

    #[test]
    fn test_rule_based_dumps_queen_then_hearts() {
        let mut s = RuleBased;
        assert_eq!(s.choose_card(&cards("2H QS KH"), Some(Suit::Clubs)), QUEEN_OF_SPADES);
        assert_eq!(s.choose_card(&cards("2H 9H KD"), Some(Suit::Clubs)), card("9H"));
        assert_eq!(s.choose_card(&cards("2D KD"), Some(Suit::Clubs)), card("KD"));
        assert_eq!(s.choose_card(&cards("2D KD"), Some(Suit::Diamonds)), card("2D"));
    }

    #[test]
    fn test_rule_based_leads_non_heart() {
        let mut s = RuleBased;
        assert_eq!(s.choose_card(&cards("2H 9C 4S"), None), card("4S"));
        assert_eq!(s.choose_card(&cards("AH 3H"), None), card("3H"));
    }

    #[test]
    fn test_kind_parses_and_builds() {
        assert_eq!("rule_based".parse::<StrategyKind>(), Ok(StrategyKind::RuleBased));
        assert!("smart".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::Random.build(Some(1)).name(), "random");
        assert_eq!(StrategyKind::default().build(None).name(), "lowest_card");
    }
}
