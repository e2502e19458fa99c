pub mod command;
pub mod controller;
pub mod prompts;
pub mod session;

pub use command::{parse_human_command, HumanCommand};
pub use controller::{
    AgentTurn, GameResult, HumanTurn, MatchController, MatchState, AGENT_SIDE, HUMAN_SIDE,
};
pub use session::{process_agent_turn, process_human_line, run_match_loop};
