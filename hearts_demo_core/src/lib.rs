//! # 红心大战 (Hearts) 演示牌局核心库
//!
//! 这个 `core` crate 包含单人演示牌局的全部规则与状态：
//! 牌与牌堆、可复现的洗牌发牌、出牌合法性、结算与计分、电脑策略，
//! 以及驱动人类与三家电脑轮流出牌的牌桌状态机。
//! 它不依赖任何运行时或界面，渲染层只读取 [`RoundView`] 并提交出牌请求。

mod card;
mod config;
mod error;
mod logic;
mod message;
mod rules;
mod state;
mod strategy;

pub use card::*;

pub use config::*;

pub use error::*;

pub use logic::*;

pub use message::*;

pub use rules::*;

pub use state::*;

pub use strategy::*;
