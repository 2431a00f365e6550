use crate::card::{Card, Suit};
use crate::rules::is_legal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};
use uuid::Uuid;

pub type RoundId = Uuid;

/// 座位 (Seat)
/// 变体顺序即发牌顺序：北、东、南、西
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    North,
    East,
    South,
    West,
}

/// 唯一由人类操作的座位
pub const HUMAN_SEAT: Seat = Seat::South;

impl Seat {
    pub const DEAL_ORDER: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];
    pub const TURN_ORDER: [Seat; 4] = [Seat::South, Seat::East, Seat::North, Seat::West];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 出牌顺序中的下一个座位：南 -> 东 -> 北 -> 西 -> 南
    pub fn next(self) -> Seat {
        match self {
            Seat::South => Seat::East,
            Seat::East => Seat::North,
            Seat::North => Seat::West,
            Seat::West => Seat::South,
        }
    }

    pub fn is_human(self) -> bool {
        self == HUMAN_SEAT
    }

    pub fn name(self) -> &'static str {
        match self {
            Seat::North => "north",
            Seat::East => "east",
            Seat::South => "south",
            Seat::West => "west",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 按座位索引的一组值，例如每家的手牌、得分、赢墩数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerSeat<T>(pub [T; 4]);

pub type Hands = PerSeat<Vec<Card>>;

impl<T> PerSeat<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::DEAL_ORDER.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PerSeat<U> {
        PerSeat(self.0.each_ref().map(f))
    }
}

impl<T> Index<Seat> for PerSeat<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        &self.0[seat.index()]
    }
}

impl<T> IndexMut<Seat> for PerSeat<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.0[seat.index()]
    }
}

// 序列化为 {"north": .., "east": .., "south": .., "west": ..}，方便渲染层按座位名读取
impl<T: Serialize> Serialize for PerSeat<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (seat, value) in self.iter() {
            map.serialize_entry(seat.name(), value)?;
        }
        map.end()
    }
}

/// 牌局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Dealing,
    Playing,
    Collecting, // 一墩已满四张，停留展示后结算
    Finished,   // 第 13 墩结算后的终态
}

/// 一次出牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

/// 当前这一墩，0 到 4 次出牌
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trick {
    pub plays: Vec<Play>,
}

impl Trick {
    pub const SIZE: usize = 4;

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == Self::SIZE
    }

    /// 首张牌的花色
    pub fn led_suit(&self) -> Option<Suit> {
        self.plays.first().map(|p| p.card.suit)
    }
}

/// 已结算的一墩
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub plays: Vec<Play>,
    pub winner: Seat,
    pub points: u32,
}

/// 一局牌的全部状态
///
/// 所有修改都经由 `apply_play` 和 `collect_trick` 返回新的状态，
/// 被拒绝的输入不会改动任何字段。
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub round_id: RoundId,
    pub seed: u32,
    pub phase: Phase,
    // 手牌保持发牌时的顺序 (减去已出的牌)，电脑策略的平局规则依赖这个顺序
    pub hands: Hands,
    pub trick: Trick,
    pub completed_tricks: Vec<CompletedTrick>,
    pub scores: PerSeat<u32>,
    pub tricks_won: PerSeat<u8>,
    pub leader: Seat,
    pub to_act: Option<Seat>, // 只有 Playing 阶段才有值
    pub hearts_broken: bool,
    pub message: String,
}

/// 渲染层读取的快照，不包含其他座位的手牌
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundView {
    pub round_id: RoundId,
    pub seed: u32,
    pub phase: Phase,
    pub trick_number: usize,
    pub hand: Vec<HandCard>,
    pub hand_sizes: PerSeat<usize>,
    pub trick: Vec<Play>,
    pub scores: PerSeat<u32>,
    pub tricks_won: PerSeat<u8>,
    pub leader: Seat,
    pub to_act: Option<Seat>,
    pub hearts_broken: bool,
    pub message: String,
}

/// 南家手牌中的一张牌，附带它在底层手牌中的位置和是否可出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandCard {
    pub index: usize,
    pub card: Card,
    pub playable: bool,
}

// --- RoundState 的实现方法 ---

impl RoundState {
    /// 已结算的墩数
    pub fn tricks_played(&self) -> usize {
        self.completed_tricks.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// 当前是否轮到人类出牌
    pub fn awaiting_human(&self) -> bool {
        self.phase == Phase::Playing && self.to_act.is_some_and(Seat::is_human)
    }

    pub fn total_points(&self) -> u32 {
        self.scores.0.iter().sum()
    }

    pub fn hand_sizes(&self) -> PerSeat<usize> {
        self.hands.map(Vec::len)
    }

    /// 按渲染层的需要生成快照：南家手牌按花色、点数排序，并标出可出的牌
    pub fn view(&self) -> RoundView {
        let south = &self.hands[HUMAN_SEAT];
        let can_act = self.awaiting_human();

        let mut hand: Vec<HandCard> = south
            .iter()
            .enumerate()
            .map(|(index, &card)| HandCard {
                index,
                card,
                playable: can_act && is_legal(card, south, &self.trick, self.hearts_broken),
            })
            .collect();
        hand.sort_by_key(|h| (h.card.suit, h.card.rank));

        RoundView {
            round_id: self.round_id,
            seed: self.seed,
            phase: self.phase,
            trick_number: (self.tricks_played() + 1).min(crate::card::HAND_SIZE),
            hand,
            hand_sizes: self.hand_sizes(),
            trick: self.trick.plays.clone(),
            scores: self.scores,
            tricks_won: self.tricks_won,
            leader: self.leader,
            to_act: self.to_act,
            hearts_broken: self.hearts_broken,
            message: self.message.clone(),
        }
    }
}

impl RoundView {
    /// 终局时南家是否得分最低 (红心大战分数越低越好，并列也算赢)
    pub fn human_won(&self) -> bool {
        self.phase == Phase::Finished
            && self.scores.0.iter().all(|&s| self.scores[HUMAN_SEAT] <= s)
    }
}
