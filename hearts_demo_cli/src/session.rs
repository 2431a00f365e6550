use crate::render;
use hearts_demo_core::{Card, Command, Continuation, RoundView, Table, TableConfig, HUMAN_SEAT};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// 玩家在终端输入的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Play(PlayTarget),
    State,
    Restart(Option<u32>),
    Help,
    Quit,
}

/// 出哪张牌：显示顺序中的序号 (从 1 开始) 或者牌面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTarget {
    Position(usize),
    Card(Card),
}

pub fn parse_input(line: &str) -> Result<Input, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.first().copied() {
        Some("play") | Some("p") => {
            let Some(arg) = parts.get(1) else {
                return Err("用法: play <序号|牌>".to_string());
            };
            if let Ok(pos) = arg.parse::<usize>() {
                return Ok(Input::Play(PlayTarget::Position(pos)));
            }
            arg.parse::<Card>()
                .map(|c| Input::Play(PlayTarget::Card(c)))
                .map_err(|e| e.to_string())
        }
        Some("state") => Ok(Input::State),
        Some("restart") => match parts.get(1) {
            None => Ok(Input::Restart(None)),
            Some(seed) => seed
                .parse()
                .map(|s| Input::Restart(Some(s)))
                .map_err(|_| format!("无效的种子: {}", seed)),
        },
        Some("help") => Ok(Input::Help),
        Some("quit") | Some("exit") => Ok(Input::Quit),
        _ => Err(format!("未知命令: {}", line.trim())),
    }
}

/// 把显示用的序号或牌面换算成底层手牌下标
pub fn resolve_target(view: &RoundView, target: PlayTarget) -> Option<usize> {
    match target {
        PlayTarget::Position(pos) => pos.checked_sub(1).and_then(|i| view.hand.get(i)).map(|h| h.index),
        PlayTarget::Card(card) => view.hand.iter().find(|h| h.card == card).map(|h| h.index),
    }
}

// 正在计时的延时步骤
struct Timer {
    continuation: Continuation,
    handle: JoinHandle<()>,
}

/// 让计时任务和牌桌当前待执行的步骤保持一致，同一时间只留一个计时任务
fn sync_timer(table: &Table, timer: &mut Option<Timer>, tx: &mpsc::Sender<Continuation>) {
    let wanted = table.pending();
    if timer.as_ref().map(|t| t.continuation) == wanted {
        return;
    }
    if let Some(old) = timer.take() {
        old.handle.abort();
    }
    if let Some(continuation) = wanted {
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(continuation.delay).await;
            let _ = tx.send(continuation).await;
        });
        *timer = Some(Timer { continuation, handle });
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(config: TableConfig) -> anyhow::Result<()> {
    let mut table = Table::new(config);
    let (tx, mut rx) = mpsc::channel::<Continuation>(8);
    let mut timer: Option<Timer> = None;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    render::print_help();
    render::draw(&table.view());
    sync_timer(&table, &mut timer, &tx);

    loop {
        prompt();
        tokio::select! {
            Some(continuation) = rx.recv() => {
                if timer.as_ref().is_some_and(|t| t.continuation == continuation) {
                    timer = None;
                }
                let events = table.fire(continuation);
                if !events.is_empty() {
                    debug!("{:?}", events);
                    render::draw(&table.view());
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Ok(Input::Play(target)) => {
                        let view = table.view();
                        match resolve_target(&view, target) {
                            Some(index) => match table.handle_command(Command::PlayCard { seat: HUMAN_SEAT, index }) {
                                Ok(_) => render::draw(&table.view()),
                                Err(e) => println!("无法出牌: {}", e),
                            },
                            None => println!("手里没有这张牌"),
                        }
                    }
                    Ok(Input::State) => println!("{}", serde_json::to_string_pretty(&table.view())?),
                    Ok(Input::Restart(seed)) => {
                        table.handle_command(Command::Restart { seed })?;
                        info!("玩家重新开局");
                        render::draw(&table.view());
                    }
                    Ok(Input::Help) => render::print_help(),
                    Ok(Input::Quit) => break,
                    Err(msg) => println!("{}", msg),
                }
            }
        }
        sync_timer(&table, &mut timer, &tx);
    }

    if let Some(t) = timer.take() {
        t.handle.abort();
    }
    println!("再见!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearts_demo_core::Seat;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("play 3"), Ok(Input::Play(PlayTarget::Position(3))));
        assert_eq!(parse_input("p qs"), Ok(Input::Play(PlayTarget::Card("QS".parse().unwrap()))));
        assert_eq!(parse_input("restart"), Ok(Input::Restart(None)));
        assert_eq!(parse_input("restart 7"), Ok(Input::Restart(Some(7))));
        assert_eq!(parse_input(" quit "), Ok(Input::Quit));
        assert!(parse_input("play").is_err());
        assert!(parse_input("play zz").is_err());
        assert!(parse_input("restart x").is_err());
        assert!(parse_input("dance").is_err());
    }

    #[test]
    fn test_resolve_target_maps_display_position() {
        let mut table = Table::new(TableConfig::default());
        table.settle();
        let view = table.view();
        let first = view.hand[0];
        assert_eq!(resolve_target(&view, PlayTarget::Position(1)), Some(first.index));
        assert_eq!(resolve_target(&view, PlayTarget::Position(0)), None);
        assert_eq!(resolve_target(&view, PlayTarget::Position(14)), None);
        assert_eq!(resolve_target(&view, PlayTarget::Card(first.card)), Some(first.index));
        assert_eq!(table.round().hands[Seat::South][first.index], first.card);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_pending_step() {
        let mut table = Table::new(TableConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = None;
        sync_timer(&table, &mut timer, &tx);

        let continuation = rx.recv().await.unwrap();
        assert_eq!(Some(continuation), table.pending());
        table.fire(continuation);
        assert!(table.round().awaiting_human());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_aborts_old_timer() {
        let mut table = Table::new(TableConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = None;
        sync_timer(&table, &mut timer, &tx);
        let old = timer.as_ref().map(|t: &Timer| t.continuation).unwrap();

        table.restart(None);
        sync_timer(&table, &mut timer, &tx);

        let fired = rx.recv().await.unwrap();
        assert_ne!(fired, old);
        assert_eq!(fired.generation, 1);
    }
}
