//! Turn-alternating referee between the local player and the agent.

use std::fmt;
use std::thread;

use log::{debug, info, warn};
use rand::Rng;
use shakmaty::{Color, Piece, Square};

use super::prompts;
use crate::agent::{next_tier, Agent, Role};
use crate::board::{parse_square, side_label, Board, Move};
use crate::check::warn_if_in_check;
use crate::config::MatchConfig;
use crate::diff::detect_move;
use crate::error::{GameError, Result};
use crate::repair::parse_reply;
use crate::rules::is_legal;
use crate::time::MatchClock;
use crate::wire::{decode, encode, AgentReply, StructuredBoard};

/// Side played from the keyboard; the agent plays the other one.
pub const HUMAN_SIDE: Color = Color::White;
pub const AGENT_SIDE: Color = Color::Black;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    AwaitingHumanMove,
    AwaitingAgentMove,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// The opponent of this side lost its king.
    Winner(Color),
    /// Wall-clock budget elapsed first.
    Timeout,
    /// Every agent tier failed within a single turn.
    AgentExhausted,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner(c) => write!(f, "Game over: {} wins!", side_label(*c)),
            GameResult::Timeout => write!(f, "Game over: time limit reached"),
            GameResult::AgentExhausted => {
                write!(f, "Game over: agent could not produce a valid move")
            }
        }
    }
}

/// Outcome of an accepted human submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanTurn {
    pub mv: Move,
    pub result: Option<GameResult>,
}

/// Outcome of one attempt budget on the agent's turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTurn {
    Committed {
        mv: Move,
        comment: Option<String>,
        taunt: Option<String>,
        attempts: u32,
        result: Option<GameResult>,
    },
    /// Budget spent without a commit; the next call uses `model`.
    Escalated { model: String },
    /// Every tier failed within this turn and the match ended.
    Exhausted,
}

struct Accepted {
    mv: Move,
    board: Board,
    reply: AgentReply,
}

pub struct MatchController<A: Agent> {
    state: MatchState,
    board: Board,
    agent: A,
    config: MatchConfig,
    clock: MatchClock,
    tier: usize,
    /// Failed budgets in the current agent turn
    escalations: usize,
    retry_count: u32,
    last_human_move: Option<Move>,
    result: Option<GameResult>,
}

impl<A: Agent> MatchController<A> {
    /// Decode the initial encoding, prime the agent session and start the clock.
    pub fn new(initial: &StructuredBoard, agent: A, config: MatchConfig) -> Result<Self> {
        let board = decode(initial)?;
        Self::with_board(board, agent, config)
    }

    /// Start from an already decoded board; more than one king of a color
    /// is rejected, a missing king ends the match at once.
    pub fn with_board(board: Board, mut agent: A, config: MatchConfig) -> Result<Self> {
        for color in [Color::White, Color::Black] {
            let count = board.king_count(color);
            if count > 1 {
                warn!("{} kings for {} in the initial board", count, side_label(color));
                return Err(GameError::ExtraKing { color, count });
            }
        }
        for message in prompts::session_messages(&encode(&board), AGENT_SIDE, &config.language) {
            agent.send_feedback(Role::System, &message);
        }
        let tier = config.models.tier_of(config.initial_model.as_deref());
        let clock = MatchClock::start(config.time_limit());
        let mut controller = Self {
            state: MatchState::AwaitingHumanMove,
            board,
            agent,
            config,
            clock,
            tier,
            escalations: 0,
            retry_count: 0,
            last_human_move: None,
            result: None,
        };
        controller.check_terminal();
        Ok(controller)
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn encoding(&self) -> StructuredBoard {
        encode(&self.board)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub fn current_model(&self) -> &str {
        self.config.models.model(self.tier)
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn is_over(&self) -> bool {
        self.state == MatchState::GameOver
    }

    /// End the match on timeout. Returns true once the match is over.
    pub fn check_clock(&mut self) -> bool {
        if self.state != MatchState::GameOver && self.clock.exceeded() {
            info!("time limit reached after {:?}", self.clock.elapsed());
            self.finish(GameResult::Timeout);
        }
        self.is_over()
    }

    fn finish(&mut self, result: GameResult) {
        self.result = Some(result);
        self.state = MatchState::GameOver;
        self.agent
            .send_feedback(Role::User, &prompts::match_outcome(&result.to_string()));
    }

    fn check_terminal(&mut self) -> Option<GameResult> {
        if let Some(loser) = self.board.missing_king() {
            let result = GameResult::Winner(loser.other());
            info!("{}", result);
            self.finish(result);
        }
        self.result
    }

    /// Validate and commit the local player's move.
    ///
    /// Rejections leave the board and the turn untouched.
    pub fn submit_human_move(&mut self, piece: Piece, from: Square, to: Square) -> Result<HumanTurn> {
        match self.state {
            MatchState::GameOver => return Err(GameError::GameOver),
            MatchState::AwaitingAgentMove => return Err(GameError::OutOfTurn),
            MatchState::AwaitingHumanMove => {}
        }

        match self.board.piece_at(from) {
            None => return Err(GameError::EmptyOrigin { square: from }),
            Some(actual) if actual != piece => {
                return Err(GameError::IllegalMove {
                    piece: piece.char(),
                    from,
                    to,
                })
            }
            Some(_) => {}
        }

        if !is_legal(Some(piece), from, to, &self.board, HUMAN_SIDE)? {
            return Err(GameError::IllegalMove {
                piece: piece.char(),
                from,
                to,
            });
        }

        let mv = Move::new(piece, from, to);
        let next = self.board.apply_move(&mv)?;
        if let Some(warning) = warn_if_in_check(&next, HUMAN_SIDE, None) {
            return Err(GameError::SelfCheck(warning));
        }

        info!("move executed: {}", mv);
        self.board = next;
        self.last_human_move = Some(mv);
        self.state = MatchState::AwaitingAgentMove;
        let result = self.check_terminal();
        Ok(HumanTurn { mv, result })
    }

    fn temperature(&self) -> f32 {
        let (lo, hi) = (self.config.temperature_min, self.config.temperature_max);
        if hi > lo {
            rand::rng().random_range(lo..hi)
        } else {
            lo
        }
    }

    /// Run one attempt budget against the current agent tier.
    ///
    /// Every rejected reply is discarded from the agent's history and answered
    /// with corrective feedback. A spent budget escalates to the next tier and
    /// leaves the turn with the agent.
    pub fn play_agent_turn(&mut self) -> Result<AgentTurn> {
        match self.state {
            MatchState::GameOver => return Err(GameError::GameOver),
            MatchState::AwaitingHumanMove => return Err(GameError::OutOfTurn),
            MatchState::AwaitingAgentMove => {}
        }

        let prompt = prompts::move_prompt(
            &encode(&self.board),
            self.last_human_move.as_ref(),
            HUMAN_SIDE,
        );
        let budget = self.config.max_attempts.max(1);
        self.retry_count = 0;

        while self.retry_count < budget {
            self.retry_count += 1;
            let model = self.current_model().to_string();
            let temperature = self.temperature();
            debug!(
                "attempt {}/{} with {} (temperature {:.2}, {:?} left)",
                self.retry_count,
                budget,
                model,
                temperature,
                self.clock.remaining()
            );

            let raw = match self.agent.propose_move(&prompt, &model, temperature) {
                Ok(text) => text,
                Err(e) => {
                    warn!("no response from agent: {}", e);
                    thread::sleep(self.config.retry_delay());
                    continue;
                }
            };

            let Some(accepted) = self.review_reply(&raw) else {
                continue;
            };

            if self.retry_count > 1 {
                self.agent
                    .send_feedback(Role::User, &prompts::accepted_after_retry(AGENT_SIDE));
            }
            info!("correct move detected: {}", accepted.mv);
            self.board = accepted.board;
            self.escalations = 0;
            self.state = MatchState::AwaitingHumanMove;
            let result = self.check_terminal();
            return Ok(AgentTurn::Committed {
                mv: accepted.mv,
                comment: accepted.reply.comment,
                taunt: accepted.reply.taunt,
                attempts: self.retry_count,
                result,
            });
        }

        self.escalations += 1;
        if self.escalations >= self.config.models.len() {
            warn!("every agent tier failed this turn");
            self.finish(GameResult::AgentExhausted);
            return Ok(AgentTurn::Exhausted);
        }
        self.tier = next_tier(self.tier, self.config.models.len());
        let model = self.current_model().to_string();
        info!("no valid move from the agent, escalating to {}", model);
        Ok(AgentTurn::Escalated { model })
    }

    /// Parse, diff and validate one reply. `None` means rejected, with
    /// feedback already sent.
    fn review_reply(&mut self, raw: &str) -> Option<Accepted> {
        let current = encode(&self.board);

        let reply = match parse_reply(raw) {
            Ok(reply) if reply.board.has_both_sides() => reply,
            Ok(_) => {
                warn!("reply carries no complete board");
                self.reject(prompts::malformed_reply(&current));
                return None;
            }
            Err(e) => {
                warn!("{}", e);
                self.reject(prompts::malformed_reply(&current));
                return None;
            }
        };

        let candidate = match decode(&reply.board) {
            Ok(board) => board,
            Err(e) => {
                warn!("{}", e);
                self.reject(prompts::malformed_reply(&current));
                return None;
            }
        };

        let mv = match detect_move(&self.board, &candidate) {
            Ok(mv) => mv,
            Err(GameError::NoMove) => {
                debug!("agent sent back an unchanged board");
                self.recover_stated_move(&reply, &current);
                return None;
            }
            Err(e) => {
                warn!("error during move detection: {}", e);
                self.reject(prompts::incoherent_board(AGENT_SIDE, &e.to_string(), &current));
                return None;
            }
        };
        debug!("move revealed from agent board: {}", mv);

        if !matches!(is_legal(Some(mv.piece), mv.from, mv.to, &self.board, AGENT_SIDE), Ok(true)) {
            warn!("illegal move proposed by agent: {}", mv);
            self.reject(prompts::illegal_move(AGENT_SIDE, &mv));
            return None;
        }

        if let Some(warning) = warn_if_in_check(&candidate, AGENT_SIDE, None) {
            warn!("{}", warning);
            self.reject(prompts::left_in_check(AGENT_SIDE, &warning, &current));
            return None;
        }

        Some(Accepted {
            mv,
            board: candidate,
            reply,
        })
    }

    /// Drop the last reply from the agent's history and steer it.
    fn reject(&mut self, feedback: String) {
        self.agent.discard_last_reply();
        self.agent.send_feedback(Role::User, &feedback);
    }

    /// The agent named a move but did not update the board: play it on a
    /// trial board and send the resulting encoding back. The reply stays in
    /// the history and nothing is committed.
    fn recover_stated_move(&mut self, reply: &AgentReply, current: &StructuredBoard) {
        let stated = self
            .agent
            .peek_last_reply(Role::Assistant)
            .and_then(|text| parse_reply(&text).ok())
            .filter(|r| r.proposed_move.is_some())
            .unwrap_or_else(|| reply.clone());

        let Some(text) = stated.proposed_move.clone() else {
            self.agent
                .send_feedback(Role::User, &prompts::missing_move(AGENT_SIDE, current));
            return;
        };

        match self.play_stated(&stated) {
            Some(corrected) => {
                debug!("board updated with stated move {}", text);
                self.agent.send_feedback(
                    Role::User,
                    &prompts::unchanged_board(AGENT_SIDE, &text, &corrected),
                );
            }
            None => {
                self.agent.send_feedback(
                    Role::User,
                    &prompts::unplayable_stated_move(AGENT_SIDE, &text, current),
                );
            }
        }
    }

    fn play_stated(&self, reply: &AgentReply) -> Option<StructuredBoard> {
        let (from, to) = reply.stated_squares()?;
        let (from, to) = (parse_square(&from).ok()?, parse_square(&to).ok()?);
        if !is_legal(None, from, to, &self.board, AGENT_SIDE).ok()? {
            return None;
        }
        let next = self.board.apply(None, from, to).ok()?;
        Some(encode(&next))
    }
}
