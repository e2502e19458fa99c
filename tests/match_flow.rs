//! End-to-end tests of the referee against a scripted agent.

use std::io::Cursor;
use std::time::Duration;

use scacchiera::agent::{Role as ChatRole, ScriptedAgent};
use scacchiera::board::{Board, Move};
use scacchiera::config::MatchConfig;
use scacchiera::game::{
    run_match_loop, AgentTurn, GameResult, MatchController, MatchState,
};
use scacchiera::wire::{encode, AgentReply, StructuredBoard};
use scacchiera::GameError;
use shakmaty::{Color, Piece, Role, Square};

fn config() -> MatchConfig {
    MatchConfig::default().retry_delay_ms(0).max_attempts(2)
}

fn pawn(color: Color) -> Piece {
    Role::Pawn.of(color)
}

/// Reply whose board is `board` after moving `from` to `to`.
fn reply_after(board: &Board, from: Square, to: Square, stated: Option<&str>) -> String {
    let next = board.apply(None, from, to).unwrap();
    reply_with(&next, stated)
}

fn reply_with(board: &Board, stated: Option<&str>) -> String {
    let reply = AgentReply {
        board: encode(board),
        proposed_move: stated.map(String::from),
        comment: Some("Difesa classica".to_string()),
        taunt: Some("Tocca a te".to_string()),
    };
    serde_json::to_string(&reply).unwrap()
}

fn after_e4() -> Board {
    Board::standard().apply(None, Square::E2, Square::E4).unwrap()
}

fn controller_with(replies: Vec<String>, config: MatchConfig) -> MatchController<ScriptedAgent> {
    MatchController::new(&StructuredBoard::standard(), ScriptedAgent::new(replies), config).unwrap()
}

#[test]
fn test_session_is_primed_with_system_messages() {
    let controller = controller_with(vec![], config());
    let history = controller.agent().history();
    assert_eq!(history.of_role(ChatRole::System).count(), 3);
    assert!(history.messages()[0].content.contains("italiano"));
    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
}

#[test]
fn test_human_then_agent_move_commits() {
    let reply = reply_after(&after_e4(), Square::E7, Square::E5, Some("e7-e5"));
    let mut controller = controller_with(vec![reply], config());

    let turn = controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();
    assert_eq!(turn.mv, Move::new(pawn(Color::White), Square::E2, Square::E4));
    assert_eq!(turn.result, None);
    assert_eq!(controller.state(), MatchState::AwaitingAgentMove);

    match controller.play_agent_turn().unwrap() {
        AgentTurn::Committed {
            mv,
            attempts,
            result,
            taunt,
            ..
        } => {
            assert_eq!(mv, Move::new(pawn(Color::Black), Square::E7, Square::E5));
            assert_eq!(attempts, 1);
            assert_eq!(result, None);
            assert_eq!(taunt.as_deref(), Some("Tocca a te"));
        }
        other => panic!("expected a committed move, got {:?}", other),
    }

    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
    assert!(controller.board().is_game_active());
    assert_eq!(controller.board().piece_at(Square::E5), Some(pawn(Color::Black)));
    assert!(controller.agent().feedback().is_empty());

    // il prompt contiene la mossa dei bianchi
    let prompt = controller.agent().history().last(ChatRole::User).unwrap();
    assert!(prompt.content.contains("White move: e2-e4"));
}

#[test]
fn test_unchanged_board_gets_corrected_encoding() {
    let reply = reply_with(&after_e4(), Some("e7-e5"));
    let mut controller = controller_with(vec![reply], config());
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    let turn = controller.play_agent_turn().unwrap();
    assert!(matches!(turn, AgentTurn::Escalated { .. }));
    assert_eq!(controller.state(), MatchState::AwaitingAgentMove);
    assert_eq!(controller.board(), &after_e4());

    let feedback = controller.agent().feedback();
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0].contains("has not changed"));
    let corrected = encode(&after_e4().apply(None, Square::E7, Square::E5).unwrap());
    assert!(feedback[0].contains(&corrected.to_json()));

    // la risposta resta nella storia
    assert!(controller.agent().history().last(ChatRole::Assistant).is_some());
}

#[test]
fn test_unchanged_board_with_illegal_stated_move() {
    let reply = reply_with(&after_e4(), Some("e7-e4"));
    let mut controller = controller_with(vec![reply], config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    assert!(matches!(
        controller.play_agent_turn().unwrap(),
        AgentTurn::Escalated { .. }
    ));
    let feedback = controller.agent().feedback();
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0].contains("'e7-e4', but it cannot be played"));
    assert!(feedback[0].contains(&encode(&after_e4()).to_json()));
    assert_eq!(controller.board(), &after_e4());
    assert_eq!(controller.state(), MatchState::AwaitingAgentMove);

    // nuova risposta valida accodata a partita in corso
    controller
        .agent_mut()
        .push_reply(reply_after(&after_e4(), Square::E7, Square::E5, Some("e7-e5")));
    assert!(matches!(
        controller.play_agent_turn().unwrap(),
        AgentTurn::Committed { .. }
    ));
    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
}

#[test]
fn test_unchanged_board_with_unreadable_stated_move() {
    let reply = reply_with(&after_e4(), Some("e7"));
    let mut controller = controller_with(vec![reply], config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    controller.play_agent_turn().unwrap();
    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("'e7', but it cannot be played"));
    assert_eq!(controller.board(), &after_e4());
    assert_eq!(controller.state(), MatchState::AwaitingAgentMove);
}

#[test]
fn test_unchanged_board_without_stated_move() {
    let reply = reply_with(&after_e4(), None);
    let mut controller = controller_with(vec![reply], config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    controller.play_agent_turn().unwrap();
    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("did not propose a valid move"));
    assert_eq!(controller.state(), MatchState::AwaitingAgentMove);
}

#[test]
fn test_illegal_agent_move_is_discarded_then_retried() {
    let board = after_e4();
    let illegal = reply_after(&board, Square::E7, Square::E4, Some("e7-e4"));
    let legal = reply_after(&board, Square::D7, Square::D5, Some("d7-d5"));
    let mut controller = controller_with(vec![illegal.clone(), legal], config());
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    match controller.play_agent_turn().unwrap() {
        AgentTurn::Committed { mv, attempts, .. } => {
            assert_eq!(mv.from, Square::D7);
            assert_eq!(attempts, 2);
        }
        other => panic!("expected a committed move, got {:?}", other),
    }

    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("Illegal move proposed by assistant: 'e7->e4'"));
    assert!(feedback[1].contains("Well done"));

    let history = controller.agent().history();
    assert!(history
        .of_role(ChatRole::Assistant)
        .all(|m| m.content != illegal));
}

#[test]
fn test_agent_moving_human_piece_is_rejected() {
    let reply = reply_after(&after_e4(), Square::D2, Square::D3, None);
    let mut controller = controller_with(vec![reply], config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    assert!(matches!(
        controller.play_agent_turn().unwrap(),
        AgentTurn::Escalated { .. }
    ));
    assert!(controller.agent().feedback()[0].contains("not valid for Black"));
}

#[test]
fn test_malformed_reply_then_valid_one() {
    let valid = reply_after(&after_e4(), Square::G8, Square::F6, None);
    let replies = vec!["```json\n{\"neri\": [oops".to_string(), valid];
    let mut controller = controller_with(replies, config());
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    assert!(matches!(
        controller.play_agent_turn().unwrap(),
        AgentTurn::Committed { .. }
    ));
    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("seems incorrect as JSON"));
}

#[test]
fn test_reply_without_board_is_malformed() {
    let replies = vec![r#"{"mossa_proposta": "e7-e5"}"#.to_string()];
    let mut controller = controller_with(replies, config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    controller.play_agent_turn().unwrap();
    assert!(controller.agent().feedback()[0].contains("seems incorrect as JSON"));
}

#[test]
fn test_incoherent_board_is_rejected() {
    let mut board = after_e4();
    board.clear(Square::E7);
    board.clear(Square::D7);
    board.put(Square::E5, pawn(Color::Black));
    let reply = reply_with(&board, Some("e7-e5"));
    let mut controller = controller_with(vec![reply], config().max_attempts(1));
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    controller.play_agent_turn().unwrap();
    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("does not match a single move"));
    assert!(controller.agent().history().last(ChatRole::Assistant).is_none());
}

#[test]
fn test_agent_move_leaving_king_in_check_is_rejected() {
    let mut start = Board::empty();
    start.put(Square::A1, Role::King.of(Color::White));
    start.put(Square::E1, Role::Rook.of(Color::White));
    start.put(Square::H2, pawn(Color::White));
    start.put(Square::E8, Role::King.of(Color::Black));
    start.put(Square::E7, Role::Bishop.of(Color::Black));

    let after_human = start.apply(None, Square::H2, Square::H3).unwrap();
    let exposing = reply_after(&after_human, Square::E7, Square::D6, None);
    let agent = ScriptedAgent::new(vec![exposing]);
    let mut controller =
        MatchController::with_board(start, agent, config().max_attempts(1)).unwrap();
    controller
        .submit_human_move(pawn(Color::White), Square::H2, Square::H3)
        .unwrap();

    controller.play_agent_turn().unwrap();
    let feedback = controller.agent().feedback();
    assert!(feedback[0].contains("Black king is under attack: R from e1"));
    assert_eq!(controller.board(), &after_human);
}

#[test]
fn test_captures_on_both_sides() {
    let after_d5 = after_e4().apply(None, Square::D7, Square::D5).unwrap();
    let after_exd5 = after_d5.apply(None, Square::E4, Square::D5).unwrap();
    let replies = vec![
        reply_with(&after_d5, Some("d7-d5")),
        reply_after(&after_exd5, Square::D8, Square::D5, Some("d8xd5")),
    ];
    let mut controller = controller_with(replies, config());

    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();
    controller.play_agent_turn().unwrap();
    controller
        .submit_human_move(pawn(Color::White), Square::E4, Square::D5)
        .unwrap();
    match controller.play_agent_turn().unwrap() {
        AgentTurn::Committed { mv, .. } => {
            assert_eq!(mv, Move::new(Role::Queen.of(Color::Black), Square::D8, Square::D5));
        }
        other => panic!("expected a committed capture, got {:?}", other),
    }
    assert_eq!(
        controller.board().piece_at(Square::D5),
        Some(Role::Queen.of(Color::Black))
    );
}

#[test]
fn test_escalation_walks_the_ladder_then_gives_up() {
    let replies = vec!["nonsense".to_string(), "more nonsense".to_string()];
    let config = config().max_attempts(1).models(["tier-a", "tier-b"]);
    let mut controller = controller_with(replies, config);
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    assert_eq!(controller.current_model(), "tier-a");
    assert_eq!(
        controller.play_agent_turn().unwrap(),
        AgentTurn::Escalated {
            model: "tier-b".to_string()
        }
    );
    assert_eq!(controller.play_agent_turn().unwrap(), AgentTurn::Exhausted);
    assert_eq!(controller.state(), MatchState::GameOver);
    assert_eq!(controller.result(), Some(GameResult::AgentExhausted));

    let models: Vec<&str> = controller
        .agent()
        .calls()
        .iter()
        .map(|(m, _)| m.as_str())
        .collect();
    assert_eq!(models, vec!["tier-a", "tier-b"]);
    assert!(controller
        .agent()
        .calls()
        .iter()
        .all(|(_, t)| (0.70_f32..0.95_f32).contains(t)));
}

#[test]
fn test_transport_failures_count_as_attempts() {
    let mut agent = ScriptedAgent::default();
    agent.push_failure("connection refused");
    agent.push_reply(reply_after(&after_e4(), Square::E7, Square::E5, None));
    let mut controller =
        MatchController::new(&StructuredBoard::standard(), agent, config()).unwrap();
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();

    match controller.play_agent_turn().unwrap() {
        AgentTurn::Committed { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected a committed move, got {:?}", other),
    }
    assert_eq!(controller.retry_count(), 2);
}

#[test]
fn test_initial_model_selects_tier() {
    let config = config().initial_model("o3");
    let controller = controller_with(vec![], config);
    assert_eq!(controller.current_model(), "o3");
}

#[test]
fn test_human_rejections_leave_state_untouched() {
    let mut controller = controller_with(vec![], config());

    assert!(matches!(
        controller.submit_human_move(Role::Knight.of(Color::White), Square::G1, Square::G3),
        Err(GameError::IllegalMove { .. })
    ));
    assert!(matches!(
        controller.submit_human_move(Role::Knight.of(Color::White), Square::E2, Square::E4),
        Err(GameError::IllegalMove { .. })
    ));
    assert_eq!(
        controller.submit_human_move(pawn(Color::White), Square::E3, Square::E4),
        Err(GameError::EmptyOrigin { square: Square::E3 })
    );
    assert!(matches!(
        controller.submit_human_move(pawn(Color::Black), Square::E7, Square::E5),
        Err(GameError::IllegalMove { .. })
    ));
    assert_eq!(controller.play_agent_turn(), Err(GameError::OutOfTurn));

    assert_eq!(controller.board(), &Board::standard());
    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
}

#[test]
fn test_human_cannot_move_twice() {
    let mut controller = controller_with(vec![], config());
    controller
        .submit_human_move(pawn(Color::White), Square::E2, Square::E4)
        .unwrap();
    assert_eq!(
        controller.submit_human_move(pawn(Color::White), Square::D2, Square::D4),
        Err(GameError::OutOfTurn)
    );
}

#[test]
fn test_human_self_check_is_rejected() {
    let mut start = Board::empty();
    start.put(Square::E1, Role::King.of(Color::White));
    start.put(Square::E2, Role::Rook.of(Color::White));
    start.put(Square::E8, Role::Rook.of(Color::Black));
    start.put(Square::A8, Role::King.of(Color::Black));
    let mut controller =
        MatchController::with_board(start.clone(), ScriptedAgent::default(), config()).unwrap();

    match controller.submit_human_move(Role::Rook.of(Color::White), Square::E2, Square::D2) {
        Err(GameError::SelfCheck(reason)) => assert!(reason.contains("White king is under attack")),
        other => panic!("expected self-check, got {:?}", other),
    }
    assert_eq!(controller.board(), &start);
    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
}

#[test]
fn test_initial_board_with_two_kings_is_rejected() {
    let encoded: StructuredBoard = serde_json::from_str(
        r#"{"neri": {"re": ["e8"]}, "bianchi": {"re": ["e1", "a1"]}}"#,
    )
    .unwrap();
    let result = MatchController::new(&encoded, ScriptedAgent::default(), config());
    assert_eq!(
        result.err(),
        Some(GameError::ExtraKing {
            color: Color::White,
            count: 2
        })
    );
}

#[test]
fn test_capturing_the_king_ends_the_match() {
    let mut start = Board::empty();
    start.put(Square::E1, Role::King.of(Color::White));
    start.put(Square::D1, Role::Queen.of(Color::White));
    start.put(Square::D8, Role::King.of(Color::Black));
    let mut controller =
        MatchController::with_board(start, ScriptedAgent::default(), config()).unwrap();

    let turn = controller
        .submit_human_move(Role::Queen.of(Color::White), Square::D1, Square::D8)
        .unwrap();
    assert_eq!(turn.result, Some(GameResult::Winner(Color::White)));
    assert_eq!(controller.state(), MatchState::GameOver);
    assert_eq!(turn.result.unwrap().to_string(), "Game over: White wins!");
    assert_eq!(controller.play_agent_turn(), Err(GameError::GameOver));
}

#[test]
fn test_time_limit_ends_the_match() {
    let mut controller = controller_with(vec![], config().time_limit_secs(0));
    assert!(controller.check_clock());
    assert_eq!(controller.clock().remaining(), Duration::ZERO);
    assert_eq!(controller.result(), Some(GameResult::Timeout));
    assert_eq!(
        controller.submit_human_move(pawn(Color::White), Square::E2, Square::E4),
        Err(GameError::GameOver)
    );
}

#[test]
fn test_run_match_loop_over_text_io() {
    let reply = reply_after(&after_e4(), Square::E7, Square::E5, Some("e7-e5"));
    let mut controller = controller_with(vec![reply], config());
    let mut input = Cursor::new("\nP e2 e5\nP e2 e4\nquit\n");
    let mut output = Vec::new();

    let result = run_match_loop(&mut input, &mut output, &mut controller).unwrap();
    assert_eq!(result, None);

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Move P e2->e5 is not valid"));
    assert!(text.contains("Move executed: P e2->e4"));
    assert!(text.contains("Agent played: p e7->e5"));
    assert!(text.contains("Agent: Tocca a te"));
    assert_eq!(controller.state(), MatchState::AwaitingHumanMove);
}

#[test]
fn test_run_match_loop_reports_timeout() {
    let mut controller = controller_with(vec![], config().time_limit_secs(0));
    let mut input = Cursor::new("P e2 e4\n");
    let mut output = Vec::new();

    let result = run_match_loop(&mut input, &mut output, &mut controller).unwrap();
    assert_eq!(result, Some(GameResult::Timeout));
    assert!(String::from_utf8(output)
        .unwrap()
        .contains("Game over: time limit reached"));
}
