use crate::error::ParseCardError;
use crate::state::{Hands, Seat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
// --- 核心数据结构定义 ---

/// 花色 (Suit)
/// 声明顺序即牌堆的标准顺序，也是南家手牌的显示顺序
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,    // 梅花 ♣️
    Diamonds, // 方块 ♦️
    Spades,   // 黑桃 ♠️
    Hearts,   // 红心 ♥️
}

/// 点数 (Rank)
/// Ord 的派生即牌桌上的大小顺序：2 最小，A 最大
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

/// 单张扑克牌 (Card)
/// 花色+点数在一副 52 张的牌中唯一确定一张牌
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// 一副牌的张数
pub const DECK_SIZE: usize = 52;

/// 每位玩家的手牌张数，也是一局的墩数
pub const HAND_SIZE: usize = 13;

/// 黑桃Q，单张计 13 分
pub const QUEEN_OF_SPADES: Card = Card { rank: Rank::Queen, suit: Suit::Spades };

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Spades, Suit::Hearts];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    /// 在点数表中的位置 (2 => 0, A => 12)
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// 渲染层使用的稳定标识，例如 `Q-spades`
    pub fn key(&self) -> String {
        format!("{}-{}", self.rank.label(), self.suit.name())
    }

    pub fn is_heart(&self) -> bool {
        self.suit == Suit::Hearts
    }

    /// 这张牌的罚分：红心 1 分，黑桃Q 13 分，其余 0 分
    pub fn points(&self) -> u32 {
        if self.is_heart() {
            1
        } else if *self == QUEEN_OF_SPADES {
            13
        } else {
            0
        }
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Suit {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "♣" | "clubs" => Ok(Suit::Clubs),
            "d" | "♦" | "diamonds" => Ok(Suit::Diamonds),
            "s" | "♠" | "spades" => Ok(Suit::Spades),
            "h" | "♥" | "hearts" => Ok(Suit::Hearts),
            _ => Err(ParseCardError::Suit(s.to_string())),
        }
    }
}

impl FromStr for Rank {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "2" => Ok(Rank::Two),
            "3" => Ok(Rank::Three),
            "4" => Ok(Rank::Four),
            "5" => Ok(Rank::Five),
            "6" => Ok(Rank::Six),
            "7" => Ok(Rank::Seven),
            "8" => Ok(Rank::Eight),
            "9" => Ok(Rank::Nine),
            "10" | "T" => Ok(Rank::Ten),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "A" => Ok(Rank::Ace),
            _ => Err(ParseCardError::Rank(s.to_string())),
        }
    }
}

/// 解析 `QS`、`10h`、`th`、`2♣` 这样的短写法
impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((split, _)) = s.char_indices().last() else {
            return Err(ParseCardError::Empty);
        };
        if split == 0 {
            return Err(ParseCardError::Rank(s.to_string()));
        }
        let (rank, suit) = s.split_at(split);
        Ok(Card { rank: rank.parse()?, suit: suit.parse()? })
    }
}

// --- 牌堆与发牌 ---

/// 按标准顺序创建一副完整的 52 张牌：梅花、方块、黑桃、红心，每种花色 2 到 A
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// 可复现的伪随机数序列 (线性同余)
///
/// `seed = (seed * 9301 + 49297) mod 233280`，每次返回 `seed / 233280`，落在 [0, 1)。
/// 同一个种子总是产生同一个序列，演示牌局因此可以复现和测试。
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    const MULTIPLIER: u64 = 9301;
    const INCREMENT: u64 = 49297;
    const MODULUS: u64 = 233280;

    pub fn new(seed: u32) -> Self {
        SeededRandom { state: seed as u64 }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.state as f64 / Self::MODULUS as f64
    }
}

/// 用给定种子洗牌 (Fisher–Yates，从末尾往前走)
pub fn shuffle_with_seed(deck: &[Card], seed: u32) -> Vec<Card> {
    let mut result = deck.to_vec();
    let mut rand = SeededRandom::new(seed);
    for i in (1..result.len()).rev() {
        // 与 floor(r * (i + 1)) 一致，r < 1 保证 j <= i
        let j = (rand.next_f64() * (i + 1) as f64).floor() as usize;
        result.swap(i, j);
    }
    result
}

/// 把洗好的牌按连续的 13 张切片分给四个座位：北、东、南、西
///
/// # Panics
/// 牌数不是 52 时 panic，这是调用方的契约错误。
pub fn deal(deck: &[Card]) -> Hands {
    assert_eq!(deck.len(), DECK_SIZE, "发牌需要完整的 52 张牌");

    let mut hands = Hands::default();
    for (seat, chunk) in Seat::DEAL_ORDER.iter().zip(deck.chunks(HAND_SIZE)) {
        hands[*seat] = chunk.to_vec();
    }
    hands
}

/// 一组牌的罚分合计
pub fn count_points(cards: impl IntoIterator<Item = Card>) -> u32 {
    cards.into_iter().map(|c| c.points()).sum()
}

// --- 单元测试 ---
