use crate::card::*;
use crate::config::TableConfig;
use crate::error::PlayError;
use crate::message::{Command, GameEvent};
use crate::rules::*;
use crate::state::*;
use crate::strategy::Strategy;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

// --- 状态提示文字 ---

fn lead_message(leader: Seat, hearts_broken: bool) -> String {
    if leader.is_human() {
        let mut msg = "Your turn! Lead a card.".to_string();
        if !hearts_broken {
            msg.push_str(" Hearts not broken.");
        }
        msg
    } else {
        format!("{} leads...", leader)
    }
}

fn follow_message(led: Suit) -> String {
    if led == Suit::Hearts {
        "Your turn! Play any card.".to_string()
    } else {
        format!("Your turn! Follow {} if possible.", led.name())
    }
}

fn trick_won_message(winner: Seat, points: u32) -> String {
    let mut msg = if winner.is_human() {
        "You win the trick!".to_string()
    } else {
        format!("{} wins the trick!", winner)
    };
    if points > 0 {
        msg.push_str(&format!(" +{} points", points));
    }
    msg
}

// --- 核心状态转换函数 ---
// 都接收 &self 并返回新的状态，被拒绝时原状态保持不变。

impl RoundState {
    /// 用给定种子洗牌、发牌，进入 Dealing 阶段。南家首攻。
    pub fn new_hand(seed: u32) -> Self {
        let hands = deal(&shuffle_with_seed(&create_deck(), seed));

        RoundState {
            round_id: Uuid::new_v4(),
            seed,
            phase: Phase::Dealing,
            hands,
            trick: Trick::default(),
            completed_tricks: Vec::with_capacity(HAND_SIZE),
            scores: PerSeat::default(),
            tricks_won: PerSeat::default(),
            leader: HUMAN_SEAT,
            to_act: None,
            hearts_broken: false,
            message: "Dealing cards...".to_string(),
        }
    }

    /// 发牌动画结束，进入 Playing 阶段，由首攻者行动
    ///
    /// # Panics
    /// 不在 Dealing 阶段时 panic。
    pub fn finish_deal(&self) -> Self {
        assert_eq!(self.phase, Phase::Dealing, "只能在发牌阶段结束发牌");

        let mut next = self.clone();
        next.phase = Phase::Playing;
        next.to_act = Some(next.leader);
        next.message = if next.leader.is_human() {
            "Your turn! Choose a card to play. Hearts not broken.".to_string()
        } else {
            lead_message(next.leader, false)
        };
        next
    }

    /// 检查人类座位的出牌请求，返回要打出的牌
    pub fn check_human_play(&self, seat: Seat, index: usize) -> Result<Card, PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::NotPlaying(self.phase));
        }
        if !seat.is_human() {
            return Err(PlayError::NotHumanSeat(seat));
        }
        let card = self.check_turn(seat, index)?;
        let hand = &self.hands[seat];
        if !is_legal(card, hand, &self.trick, self.hearts_broken) {
            return Err(PlayError::IllegalCard(card));
        }
        Ok(card)
    }

    fn check_turn(&self, seat: Seat, index: usize) -> Result<Card, PlayError> {
        if self.to_act != Some(seat) {
            return Err(PlayError::NotYourTurn { seat, to_act: self.to_act });
        }
        let hand = &self.hands[seat];
        hand.get(index)
            .copied()
            .ok_or(PlayError::NoSuchCard { index, hand_len: hand.len() })
    }

    /// 唯一的出牌入口：`seat` 打出手牌中第 `index` 张
    ///
    /// 这里只检查阶段、轮次和下标；出牌规则由调用方负责 (人类走 `check_human_play`，
    /// 电脑由策略保证跟牌)。
    /// 不满四张时立即回到 Playing 并轮到下一家；满四张时停在 Collecting 等待结算。
    pub fn apply_play(&self, seat: Seat, index: usize) -> Result<(Self, Vec<GameEvent>), PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::NotPlaying(self.phase));
        }
        self.check_turn(seat, index)?;

        let mut next = self.clone();
        let mut events = Vec::new();

        let card = next.hands[seat].remove(index);
        next.trick.plays.push(Play { seat, card });
        events.push(GameEvent::CardPlayed { seat, card });
        debug!("{} 打出 {}", seat, card);

        if card.is_heart() && !next.hearts_broken {
            next.hearts_broken = true;
            events.push(GameEvent::HeartsBroken { by: seat });
        }

        if next.trick.is_complete() {
            let outcome = resolve_trick(&next.trick.plays);
            next.phase = Phase::Collecting;
            next.to_act = None;
            next.message = trick_won_message(outcome.winner, outcome.points);
            events.push(GameEvent::PhaseChanged { phase: Phase::Collecting });
        } else {
            let upcoming = seat.next();
            next.to_act = Some(upcoming);
            next.message = match next.trick.led_suit() {
                Some(led) if upcoming.is_human() => follow_message(led),
                _ => format!("{} is playing...", upcoming),
            };
        }

        Ok((next, events))
    }

    /// 结算已满四张的一墩：计分、清空、赢家成为下一墩首攻者
    ///
    /// # Panics
    /// 不在 Collecting 阶段或这一墩不满四张时 panic。
    pub fn collect_trick(&self) -> (Self, Vec<GameEvent>) {
        assert_eq!(self.phase, Phase::Collecting, "只能在 Collecting 阶段结算");
        let outcome = resolve_trick(&self.trick.plays);

        let mut next = self.clone();
        let mut events = Vec::new();

        next.scores[outcome.winner] += outcome.points;
        next.tricks_won[outcome.winner] += 1;
        next.leader = outcome.winner;
        next.completed_tricks.push(CompletedTrick {
            plays: std::mem::take(&mut next.trick.plays),
            winner: outcome.winner,
            points: outcome.points,
        });

        let trick_no = next.tricks_played();
        debug!("第 {} 墩由 {} 赢得，{} 分", trick_no, outcome.winner, outcome.points);
        events.push(GameEvent::TrickWon { winner: outcome.winner, points: outcome.points, trick_no });

        if trick_no >= HAND_SIZE {
            next.phase = Phase::Finished;
            next.to_act = None;
            next.message = "Game complete! Final scores displayed.".to_string();
            info!("牌局 {} 结束，得分 {:?}", next.round_id, next.scores.0);
            events.push(GameEvent::PhaseChanged { phase: Phase::Finished });
            events.push(GameEvent::HandFinished { scores: next.scores });
        } else {
            next.phase = Phase::Playing;
            next.to_act = Some(outcome.winner);
            next.message = lead_message(outcome.winner, next.hearts_broken);
            events.push(GameEvent::PhaseChanged { phase: Phase::Playing });
        }

        (next, events)
    }
}

// --- 出牌顺序控制 ---

pub type Generation = u64;

/// 延时执行的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FinishDeal,
    ComputerPlay(Seat),
    CollectTrick,
}

/// 一个待执行的延时步骤，带着安排它时牌桌的代数
///
/// 重新开局会让代数加一，之前安排的步骤因此失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    pub generation: Generation,
    pub delay: Duration,
    pub step: Step,
}

/// 牌桌：持有一局的状态，驱动电脑玩家，并安排延时步骤
///
/// 同一时间最多只有一个待执行的步骤，由外部的计时器在 `delay` 之后交回 [`Table::fire`]。
pub struct Table {
    config: TableConfig,
    strategy: Box<dyn Strategy>,
    round: RoundState,
    generation: Generation,
    pending: Option<Continuation>,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let strategy = config.strategy.build(config.strategy_seed);
        let round = RoundState::new_hand(config.seed);
        info!("新的一局 {}，种子 {}，电脑策略 {}", round.round_id, round.seed, strategy.name());

        let mut table = Table {
            config,
            strategy,
            round,
            generation: 0,
            pending: None,
        };
        table.schedule();
        table
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn view(&self) -> RoundView {
        self.round.view()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// 当前待执行的延时步骤
    pub fn pending(&self) -> Option<Continuation> {
        self.pending
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Vec<GameEvent>, PlayError> {
        match command {
            Command::PlayCard { seat, index } => self.play_card(seat, index),
            Command::Restart { seed } => Ok(self.restart(seed)),
        }
    }

    /// 重新发一局。代数加一，之前安排的延时步骤全部作废。
    pub fn restart(&mut self, seed: Option<u32>) -> Vec<GameEvent> {
        self.generation += 1;
        self.strategy = self.config.strategy.build(self.config.strategy_seed);
        self.round = RoundState::new_hand(seed.unwrap_or(self.config.seed));
        info!("新的一局 {}，种子 {}，第 {} 代", self.round.round_id, self.round.seed, self.generation);
        self.schedule();

        vec![
            GameEvent::HandDealt { round_id: self.round.round_id, seed: self.round.seed },
            GameEvent::PhaseChanged { phase: Phase::Dealing },
        ]
    }

    /// 人类出牌。非法请求返回错误，状态不变。
    pub fn play_card(&mut self, seat: Seat, index: usize) -> Result<Vec<GameEvent>, PlayError> {
        if let Err(e) = self.round.check_human_play(seat, index) {
            debug!("拒绝出牌请求: {}", e);
            return Err(e);
        }
        let (next, events) = self.round.apply_play(seat, index)?;
        self.round = next;
        self.schedule();
        Ok(events)
    }

    /// 执行一个到期的延时步骤。过期或不是当前待执行的步骤直接忽略。
    pub fn fire(&mut self, continuation: Continuation) -> Vec<GameEvent> {
        if continuation.generation != self.generation {
            debug!("忽略过期的步骤 {:?} (第 {} 代，当前第 {} 代)", continuation.step, continuation.generation, self.generation);
            return Vec::new();
        }
        if self.pending != Some(continuation) {
            debug!("忽略未安排的步骤 {:?}", continuation.step);
            return Vec::new();
        }
        self.pending = None;

        let events = match continuation.step {
            Step::FinishDeal => {
                self.round = self.round.finish_deal();
                vec![GameEvent::PhaseChanged { phase: Phase::Playing }]
            }
            Step::ComputerPlay(seat) => self.computer_play(seat),
            Step::CollectTrick => {
                let (next, events) = self.round.collect_trick();
                self.round = next;
                events
            }
        };
        self.schedule();
        events
    }

    /// 忽略延时，依次执行待执行的步骤，直到轮到人类或牌局结束
    pub fn settle(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Some(continuation) = self.pending {
            events.extend(self.fire(continuation));
        }
        events
    }

    fn computer_play(&mut self, seat: Seat) -> Vec<GameEvent> {
        let hand = &self.round.hands[seat];
        let offered = if self.config.computers_respect_hearts_lead {
            legal_cards(hand, &self.round.trick, self.round.hearts_broken)
        } else {
            hand.clone()
        };

        let card = self.strategy.choose_card(&offered, self.round.trick.led_suit());
        let Some(index) = hand.iter().position(|&c| c == card) else {
            panic!("策略 {} 选了 {} 手里没有的 {}", self.strategy.name(), seat, card);
        };
        debug_assert!(
            follow_suit_candidates(hand, self.round.trick.led_suit()).contains(&card),
            "{} 没有跟出首攻花色",
            seat
        );

        match self.round.apply_play(seat, index) {
            Ok((next, events)) => {
                self.round = next;
                events
            }
            Err(e) => panic!("电脑 {} 出牌失败: {}", seat, e),
        }
    }

    /// 根据当前阶段安排下一个延时步骤
    fn schedule(&mut self) {
        let pacing = &self.config.pacing;
        let next = match self.round.phase {
            Phase::Dealing => Some((Step::FinishDeal, pacing.deal())),
            Phase::Collecting => Some((Step::CollectTrick, pacing.collect())),
            Phase::Playing => match self.round.to_act {
                Some(seat) if !seat.is_human() => {
                    Some((Step::ComputerPlay(seat), pacing.computer_play(self.round.trick.is_empty())))
                }
                _ => None,
            },
            Phase::Finished => None,
        };

        self.pending = next.map(|(step, delay)| Continuation {
            generation: self.generation,
            delay,
            step,
        });
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pacing;
    use crate::strategy::StrategyKind;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    // 辅助函数：构造一个已进入 Playing 阶段的牌局，并指定手牌
    fn playing_round(hands: [&str; 4], to_act: Seat) -> RoundState {
        let mut state = RoundState::new_hand(42).finish_deal();
        state.hands = PerSeat(hands.map(|h| h.split_whitespace().map(card).collect()));
        state.leader = to_act;
        state.to_act = Some(to_act);
        state
    }

    #[test]
    fn test_new_hand_starts_dealing() {
        let state = RoundState::new_hand(42);
        assert_eq!(state.phase, Phase::Dealing);
        assert_eq!(state.leader, Seat::South);
        assert_eq!(state.to_act, None);
        assert_eq!(state.message, "Dealing cards...");
        assert!(state.hand_sizes().0.iter().all(|&n| n == 13));
    }

    #[test]
    fn test_finish_deal_gives_south_the_lead() {
        let state = RoundState::new_hand(42).finish_deal();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.to_act, Some(Seat::South));
        assert_eq!(state.message, "Your turn! Choose a card to play. Hearts not broken.");
    }

    #[test]
    fn test_apply_play_advances_turn() {
        let state = playing_round(["2C", "3C", "4C 5H", "6C"], Seat::South);
        let (next, events) = state.apply_play(Seat::South, 0).unwrap();
        assert_eq!(next.phase, Phase::Playing);
        assert_eq!(next.to_act, Some(Seat::East));
        assert_eq!(next.hands[Seat::South], vec![card("5H")]);
        assert_eq!(next.trick.plays, vec![Play { seat: Seat::South, card: card("4C") }]);
        assert_eq!(events, vec![GameEvent::CardPlayed { seat: Seat::South, card: card("4C") }]);
    }

    #[test]
    fn test_follow_message_for_south() {
        let state = playing_round(["2D", "3D", "4D", "6D"], Seat::West);
        let (next, _) = state.apply_play(Seat::West, 0).unwrap();
        assert_eq!(next.message, "Your turn! Follow diamonds if possible.");

        let state = playing_round(["2D", "3D", "4D", "6H"], Seat::West);
        let (next, _) = state.apply_play(Seat::West, 0).unwrap();
        assert_eq!(next.message, "Your turn! Play any card.");
    }

    #[test]
    fn test_heart_discard_breaks_hearts() {
        let state = playing_round(["2C", "9H", "4C", "6C"], Seat::South);
        let (state, _) = state.apply_play(Seat::South, 0).unwrap();
        let (state, events) = state.apply_play(Seat::East, 0).unwrap();
        assert!(state.hearts_broken);
        assert!(events.contains(&GameEvent::HeartsBroken { by: Seat::East }));
    }

    #[test]
    fn test_full_trick_collects_and_scores() {
        let mut state = playing_round(["KS 2C", "QS 3C", "3S 4C", "9H 5C"], Seat::South);
        for seat in Seat::TURN_ORDER {
            state = state.apply_play(seat, 0).unwrap().0;
        }
        assert_eq!(state.phase, Phase::Collecting);
        assert_eq!(state.to_act, None);
        assert_eq!(state.message, "north wins the trick! +14 points");

        let (state, events) = state.collect_trick();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.scores[Seat::North], 14);
        assert_eq!(state.tricks_won[Seat::North], 1);
        assert_eq!(state.leader, Seat::North);
        assert_eq!(state.to_act, Some(Seat::North));
        assert!(state.trick.is_empty());
        assert_eq!(state.message, "north leads...");
        assert_eq!(events[0], GameEvent::TrickWon { winner: Seat::North, points: 14, trick_no: 1 });
    }

    #[test]
    fn test_zero_point_trick_still_counts() {
        let mut state = playing_round(["2C", "3C", "AC", "5C"], Seat::South);
        for seat in Seat::TURN_ORDER {
            state = state.apply_play(seat, 0).unwrap().0;
        }
        assert_eq!(state.message, "You win the trick!");
        let (state, _) = state.collect_trick();
        assert_eq!(state.total_points(), 0);
        assert_eq!(state.tricks_won[Seat::South], 1);
        assert_eq!(state.tricks_played(), 1);
        assert_eq!(state.message, "Your turn! Lead a card. Hearts not broken.");
    }

    #[test]
    #[should_panic]
    fn test_collect_outside_collecting_panics() {
        RoundState::new_hand(1).finish_deal().collect_trick();
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let state = playing_round(["2C", "3C", "4C 5H", "6C"], Seat::South);
        let before = state.clone();

        assert_eq!(state.apply_play(Seat::East, 0), Err(PlayError::NotYourTurn { seat: Seat::East, to_act: Some(Seat::South) }));
        assert_eq!(state.apply_play(Seat::South, 2), Err(PlayError::NoSuchCard { index: 2, hand_len: 2 }));
        assert_eq!(state.check_human_play(Seat::South, 1), Err(PlayError::IllegalCard(card("5H"))));
        assert_eq!(state.check_human_play(Seat::North, 0), Err(PlayError::NotHumanSeat(Seat::North)));
        assert_eq!(state, before);

        let dealing = RoundState::new_hand(3);
        assert_eq!(dealing.apply_play(Seat::South, 0), Err(PlayError::NotPlaying(Phase::Dealing)));
    }

    #[test]
    fn test_table_schedules_deal_then_waits_for_human() {
        let mut table = Table::new(TableConfig::default());
        let pending = table.pending().unwrap();
        assert_eq!(pending.step, Step::FinishDeal);
        assert_eq!(pending.delay, Duration::from_millis(2580));

        table.fire(pending);
        assert!(table.round().awaiting_human());
        assert_eq!(table.pending(), None);
    }

    #[test]
    fn test_table_schedules_computer_after_human() {
        let mut table = Table::new(TableConfig::default());
        table.settle();
        let index = table.view().hand.iter().find(|h| h.playable).unwrap().index;
        table.play_card(Seat::South, index).unwrap();

        let pending = table.pending().unwrap();
        assert_eq!(pending.step, Step::ComputerPlay(Seat::East));
        assert_eq!(pending.delay, Duration::from_millis(800));
    }

    #[test]
    fn test_fire_ignores_unscheduled_step() {
        let mut table = Table::new(TableConfig::default());
        let bogus = Continuation { generation: 0, delay: Duration::ZERO, step: Step::CollectTrick };
        let before = table.round().clone();
        assert!(table.fire(bogus).is_empty());
        assert_eq!(table.round(), &before);
        assert!(table.pending().is_some());
    }

    #[test]
    fn test_respecting_hearts_lead_filters_computer_options() {
        let config = TableConfig {
            computers_respect_hearts_lead: true,
            pacing: Pacing { computer_lead_ms: 0, ..Pacing::default() },
            ..TableConfig::default()
        };
        let mut table = Table::new(config);
        table.settle();
        table.round = playing_round(["2H 9C", "3C", "4C", "6C"], Seat::North);
        table.schedule();
        table.settle();
        // 北家不能首攻未破的红心，只能出 9C
        assert_eq!(table.round().trick.plays[0], Play { seat: Seat::North, card: card("9C") });
    }

    #[test]
    fn test_lowest_card_may_lead_unbroken_hearts() {
        let mut table = Table::new(TableConfig { strategy: StrategyKind::LowestCard, ..TableConfig::default() });
        table.settle();
        table.round = playing_round(["2H 9C", "3C", "4C", "6C"], Seat::North);
        table.schedule();
        table.settle();
        assert_eq!(table.round().trick.plays[0], Play { seat: Seat::North, card: card("2H") });
        assert!(table.round().hearts_broken);
    }
}
