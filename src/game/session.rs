//! Line-oriented match loop for a terminal.

use std::io::{self, BufRead, Write};

use super::command::{parse_human_command, HumanCommand, MOVE_USAGE};
use super::controller::{AgentTurn, GameResult, MatchController, MatchState};
use crate::agent::Agent;

/// Response lines for one line typed by the local player.
pub fn process_human_line<A: Agent>(line: &str, controller: &mut MatchController<A>) -> Vec<String> {
    let mut res = Vec::new();
    match parse_human_command(line) {
        HumanCommand::Move { piece, from, to } => {
            match controller.submit_human_move(piece, from, to) {
                Ok(turn) => {
                    res.push(format!("Move executed: {}", turn.mv));
                    if let Some(result) = turn.result {
                        res.push(result.to_string());
                    }
                }
                Err(e) => res.push(e.to_string()),
            }
        }
        HumanCommand::Board => res.push(controller.board().to_string()),
        HumanCommand::Json => res.push(controller.encoding().to_json_pretty()),
        HumanCommand::Help => {
            res.push(MOVE_USAGE.to_string());
            res.push("other commands: board, json, quit".to_string());
        }
        HumanCommand::Quit => {}
        HumanCommand::Invalid(reason) => res.push(format!("Invalid input, {}", reason)),
    }
    res
}

/// Response lines for one agent attempt budget.
pub fn process_agent_turn<A: Agent>(controller: &mut MatchController<A>) -> Vec<String> {
    let mut res = Vec::new();
    match controller.play_agent_turn() {
        Ok(AgentTurn::Committed {
            mv,
            comment,
            taunt,
            result,
            ..
        }) => {
            res.push(format!("Agent played: {}", mv));
            if let Some(taunt) = taunt {
                res.push(format!("Agent: {}", taunt));
            }
            if let Some(comment) = comment {
                res.push(format!("Comment: {}", comment));
            }
            if let Some(result) = result {
                res.push(result.to_string());
            }
        }
        Ok(AgentTurn::Escalated { model }) => {
            res.push(format!("Agent failed to move, switching to {}", model));
        }
        Ok(AgentTurn::Exhausted) => {
            if let Some(result) = controller.result() {
                res.push(result.to_string());
            }
        }
        Err(e) => res.push(e.to_string()),
    }
    res
}

/// Play until the match ends, the player quits or input runs out.
pub fn run_match_loop<R, W, A>(
    reader: &mut R,
    writer: &mut W,
    controller: &mut MatchController<A>,
) -> io::Result<Option<GameResult>>
where
    R: BufRead,
    W: Write,
    A: Agent,
{
    let mut buf = String::new();

    loop {
        let was_over = controller.is_over();
        if controller.check_clock() {
            if let (false, Some(result)) = (was_over, controller.result()) {
                writeln!(writer, "{}", result)?;
            }
            break;
        }

        match controller.state() {
            MatchState::GameOver => break,
            MatchState::AwaitingAgentMove => {
                for line in process_agent_turn(controller) {
                    writeln!(writer, "{}", line)?;
                }
            }
            MatchState::AwaitingHumanMove => {
                write!(writer, "\n{}\nEnter move (eg. P e2 e4): ", controller.board())?;
                writer.flush()?;

                buf.clear();
                if reader.read_line(&mut buf)? == 0 {
                    break;
                }
                let line = buf.trim();
                if line.is_empty() {
                    continue;
                }
                if parse_human_command(line) == HumanCommand::Quit {
                    break;
                }
                for r in process_human_line(line, controller) {
                    writeln!(writer, "{}", r)?;
                }
            }
        }
        writer.flush()?;
    }

    writer.flush()?;
    Ok(controller.result())
}
