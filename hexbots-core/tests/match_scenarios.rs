//! Full matches driven by scripts

use hexbots_core::{
    Event, Game, GameResult, MatchConfig, PieceCounts, PlayerConfig, ScriptError, TEAM_COLORS,
};

const HUNTER: &str = "
( charge along the facing and shoot the first enemy in sight )
: advance  1 movesLeft do move! loop ;
: shoot-enemy
  scan! 1 - 0 swap do
    I identify! drop          ( team range dir )
    rot team <> if shoot! else drop drop then
  loop ;
: play advance shoot-enemy ;
";

const IDLE: &str = ": play ;";

fn lines(src: &str) -> Vec<String> {
    src.lines().map(str::to_string).collect()
}

#[test]
fn test_hunters_beat_idle_team() {
    let config = MatchConfig::duel(lines(HUNTER), lines(IDLE))
        .with_name("hunters")
        .with_seed(3);
    let mut game = Game::new(&config).unwrap();
    let report = game.run(200);

    assert_eq!(report.result, GameResult::Won(0));
    assert_eq!(report.winner(), Some(0));
    assert_eq!(report.rounds, 3);
    assert_eq!(report.survivors, vec![2, 0]);

    // The scout fired on its own hex once it reached the Blue corner
    let journal = game.board().journal();
    assert!(journal
        .iter()
        .any(|n| n.event == Event::Destroyed { piece: 0, hex: game.board().position(0) }));
    assert!(journal.iter().any(|n| n.event == Event::Eliminated { team: 1 }));
}

#[test]
fn test_idle_match_hits_turn_limit() {
    let config = MatchConfig::duel(lines(IDLE), lines(IDLE)).with_seed(1);
    let mut game = Game::new(&config).unwrap();
    let report = game.run(30);

    assert_eq!(report.result, GameResult::Ongoing);
    assert!(report.is_draw());
    assert_eq!(report.turns, 30);
    assert_eq!(report.script_errors, 0);
}

#[test]
fn test_three_and_six_player_tables() {
    for players in [3usize, 6] {
        let config = MatchConfig::default()
            .with_side_length(7)
            .with_players(vec![PlayerConfig::shared(lines(HUNTER)); players])
            .with_pieces(PieceCounts::new(1, 0, 1))
            .with_seed(11);
        let mut game = Game::new(&config).unwrap();
        assert_eq!(game.board().team_count(), players);
        assert_eq!(game.board().team(players - 1).color(), TEAM_COLORS[players - 1]);

        let report = game.run(400);
        assert_eq!(report.survivors.len(), players);
        assert!(report.turns <= 400);
        if let Some(winner) = report.winner() {
            assert!(report.survivors[winner] > 0);
        }
    }
}

#[test]
fn test_restricted_words_during_setup_are_reported() {
    let config = MatchConfig::duel(lines("move!\n: play ;"), lines(IDLE)).with_seed(5);
    let game = Game::new(&config).unwrap();

    let vm = game.interpreter(0).unwrap();
    assert_eq!(vm.diagnostics(), &[ScriptError::Restricted("move!".into())]);
    // Setup was discarded before reaching the definition; play is empty
    assert!(vm.has_word("play"));
    assert_eq!(game.board().position(0), game.board().position(1));
}

#[test]
fn test_messages_between_teammates_across_turns() {
    let sender = lines("variable sent\n: play sent ? 0 = if hello 1 send! drop 1 sent ! then ;");
    let receiver = lines(": play 0 mesg? if 0 recv! . then ;");
    let red = PlayerConfig::robot(vec![sender, receiver, lines(IDLE)]);
    let config = MatchConfig::default()
        .with_players(vec![red, PlayerConfig::shared(lines(IDLE))])
        .with_seed(9);
    let mut game = Game::new(&config).unwrap();

    // Red scout sends, Blue scout idles
    game.play_turn();
    game.play_turn();
    assert_eq!(game.board().mailbox(1).unwrap().len(), 1);

    // Red sniper reads the message on its own turn
    assert_eq!(game.board().current(), 1);
    game.play_turn();
    assert_eq!(game.interpreter(1).unwrap().output(), &["hello".to_string()]);
    assert!(game.board().mailbox(1).unwrap().is_empty());
}
