use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 演示牌局默认使用的发牌种子
pub const DEFAULT_SEED: u32 = 42;

/// 一张牌桌的配置，所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub seed: u32,
    pub strategy: StrategyKind,
    pub strategy_seed: Option<u64>, // 只对 random 策略有意义
    // 为 true 时引擎只把符合红心首攻规则的牌交给电脑策略
    pub computers_respect_hearts_lead: bool,
    pub pacing: Pacing,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            seed: DEFAULT_SEED,
            strategy: StrategyKind::default(),
            strategy_seed: None,
            computers_respect_hearts_lead: false,
            pacing: Pacing::default(),
        }
    }
}

/// 各个延时步骤的节奏 (毫秒)，只影响展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub deal_card_ms: u64,
    pub deal_settle_ms: u64,
    pub computer_follow_ms: u64,
    pub computer_lead_ms: u64,
    pub collect_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            deal_card_ms: 40,
            deal_settle_ms: 500,
            computer_follow_ms: 800,
            computer_lead_ms: 1000,
            collect_ms: 1500,
        }
    }
}

impl Pacing {
    /// 逐张发完 52 张牌的动画，再停一下
    pub fn deal(&self) -> Duration {
        Duration::from_millis(self.deal_card_ms * crate::card::DECK_SIZE as u64 + self.deal_settle_ms)
    }

    pub fn computer_play(&self, leading: bool) -> Duration {
        Duration::from_millis(if leading { self.computer_lead_ms } else { self.computer_follow_ms })
    }

    pub fn collect(&self) -> Duration {
        Duration::from_millis(self.collect_ms)
    }
}
