use crossterm::style::Stylize;
use hearts_demo_core::{Card, HandCard, Phase, RoundView, Seat, HAND_SIZE};

/// 红色花色用红字显示
pub fn card_text(card: Card) -> String {
    let text = card.to_string();
    if card.suit.is_red() {
        text.red().to_string()
    } else {
        text
    }
}

fn hand_line(hand: &[HandCard]) -> String {
    hand.iter()
        .enumerate()
        .map(|(pos, h)| {
            let label = format!("{}:{}", pos + 1, card_text(h.card));
            if h.playable { label } else { label.dim().to_string() }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn draw(view: &RoundView) {
    println!();
    println!("=== Trick {}/{} ===", view.trick_number, HAND_SIZE);
    println!(
        "N:{}  E:{}  S:{}  W:{}{}",
        view.scores[Seat::North],
        view.scores[Seat::East],
        view.scores[Seat::South],
        view.scores[Seat::West],
        if view.hearts_broken { format!("   {}", "♥ Broken".red()) } else { String::new() },
    );

    if view.phase == Phase::Dealing {
        println!("{}", view.message);
        return;
    }

    for seat in [Seat::North, Seat::West, Seat::East] {
        println!("  {:<5} {:>2} 张", seat.name(), view.hand_sizes[seat]);
    }

    if !view.trick.is_empty() {
        let plays: Vec<String> = view
            .trick
            .iter()
            .map(|p| format!("{} {}", p.seat.name(), card_text(p.card)))
            .collect();
        println!("  桌面: {}", plays.join(", "));
    }

    println!("> {}", view.message.as_str().bold());

    if view.phase == Phase::Finished {
        println!("最终得分:");
        for seat in Seat::DEAL_ORDER {
            println!("  {:<5} {} pts ({} 墩)", seat.name(), view.scores[seat], view.tricks_won[seat]);
        }
        if view.human_won() {
            println!("🎉 You won!");
        } else {
            println!("Lower score is better in Hearts");
        }
        println!("输入 restart 再来一局");
        return;
    }

    println!("你的手牌 ({} 张):", view.hand.len());
    println!("  {}", hand_line(&view.hand));
}

pub fn print_help() {
    println!("--- 红心大战演示 ---");
    println!("可用命令:");
    println!("  play <序号|牌>            - 出牌，例如 play 3 或 play QS");
    println!("  state                     - 以 JSON 打印当前牌局");
    println!("  restart [种子]            - 重新发牌");
    println!("  help                      - 显示帮助");
    println!("  quit                      - 退出");
}
