//! Board: turn sequencing, movement, shooting, visibility and elimination
//!
//! Pieces are addressed by a global offset,
//! `team_index * pieces_per_team + local_index`.

use serde::{Deserialize, Serialize};

use crate::error::{ActionError, ConfigError};
use crate::events::{Event, MoveOutcome, Notice, ShotOutcome};
use crate::hex::{board_hexes, facing_for, DirectionTable, Hex, SIDE_LENGTHS};
use crate::mailbox::Mailbox;
use crate::piece::Piece;
use crate::team::Team;

/// Supported player counts
pub const PLAYER_COUNTS: [usize; 3] = [2, 3, 6];

/// Match result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Won(usize),
    Draw,
}

/// Starting corner per seat for each player count
fn start_corners(players: usize) -> &'static [u8] {
    match players {
        2 => &[0, 3],
        3 => &[0, 2, 4],
        _ => &[0, 1, 2, 3, 4, 5],
    }
}

#[derive(Debug)]
pub struct Board {
    teams: Vec<Team>,
    coords: Vec<Hex>,
    side: u8,
    pieces_per_team: usize,
    current: usize,
    remaining_teams: usize,
    round: u32,
    directions: DirectionTable,
    journal: Vec<Notice>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Seat the teams on their starting corners, facing the center
    pub fn new(side: u8, mut teams: Vec<Team>) -> Result<Self, ConfigError> {
        if !SIDE_LENGTHS.contains(&side) {
            return Err(ConfigError::SideLength(side));
        }
        if !PLAYER_COUNTS.contains(&teams.len()) {
            return Err(ConfigError::PlayerCount(teams.len()));
        }
        let pieces_per_team = teams[0].len();
        if pieces_per_team == 0 || teams.iter().any(|t| t.len() != pieces_per_team) {
            return Err(ConfigError::EmptyTeam);
        }

        let corners = start_corners(teams.len());
        let mut coords = Vec::with_capacity(teams.len() * pieces_per_team);
        for (team, &corner) in teams.iter_mut().zip(corners) {
            let start = Hex::corner(side, corner);
            for piece in team.pieces_mut().iter_mut() {
                piece.rotate(corner + 3);
                coords.push(start);
            }
        }

        let remaining_teams = teams.len();
        Ok(Self {
            teams,
            coords,
            side,
            pieces_per_team,
            current: 0,
            remaining_teams,
            round: 1,
            directions: DirectionTable::new(),
            journal: Vec::new(),
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn side(&self) -> u8 {
        self.side
    }

    pub fn pieces_per_team(&self) -> usize {
        self.pieces_per_team
    }

    pub fn piece_count(&self) -> usize {
        self.coords.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Offset of the piece whose turn it is
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn remaining_teams(&self) -> usize {
        self.remaining_teams
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn directions(&self) -> &DirectionTable {
        &self.directions
    }

    pub fn offset(&self, team: usize, local: usize) -> usize {
        team * self.pieces_per_team + local
    }

    /// (team, local index) of an offset
    pub fn split(&self, offset: usize) -> (usize, usize) {
        (offset / self.pieces_per_team, offset % self.pieces_per_team)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, index: usize) -> &Team {
        &self.teams[index]
    }

    pub(crate) fn team_mut(&mut self, index: usize) -> &mut Team {
        &mut self.teams[index]
    }

    /// Team that owns an offset
    pub fn team_of(&self, offset: usize) -> usize {
        self.split(offset).0
    }

    pub fn piece(&self, offset: usize) -> &Piece {
        let (t, l) = self.split(offset);
        &self.teams[t].pieces()[l]
    }

    fn piece_mut(&mut self, offset: usize) -> &mut Piece {
        let (t, l) = self.split(offset);
        &mut self.teams[t].pieces_mut()[l]
    }

    pub fn position(&self, offset: usize) -> Hex {
        self.coords[offset]
    }

    pub fn mailbox(&self, offset: usize) -> Option<&Mailbox> {
        let (t, l) = self.split(offset);
        self.teams.get(t)?.mailbox(l)
    }

    pub fn mailbox_mut(&mut self, offset: usize) -> Option<&mut Mailbox> {
        let (t, l) = self.split(offset);
        self.teams.get_mut(t)?.mailbox_mut(l)
    }

    /// Offsets of living pieces
    pub fn living(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.piece_count()).filter(|&o| self.piece(o).alive)
    }

    /// Place a piece directly. Setup and scenario building only; no events.
    pub fn place(&mut self, offset: usize, hex: Hex) -> Result<(), ActionError> {
        let hex = hex.reduce();
        if !hex.is_in_bounds(self.side) {
            return Err(ActionError::OutOfBounds(hex));
        }
        self.coords[offset] = hex;
        Ok(())
    }

    /// Journal of every notice, oldest first. This is the all-teams feed.
    pub fn journal(&self) -> &[Notice] {
        &self.journal
    }

    /// Events witnessed by at least one piece of `team`
    pub fn feed_for(&self, team: usize) -> impl Iterator<Item = &Event> + '_ {
        self.journal
            .iter()
            .filter(move |n| n.witnesses.iter().any(|&w| self.team_of(w) == team))
            .map(|n| &n.event)
    }

    // ========================================================================
    // VISIBILITY
    // ========================================================================

    /// Whether a living piece's range covers a hex
    pub fn can_see(&self, offset: usize, hex: Hex) -> bool {
        let piece = self.piece(offset);
        piece.alive && self.coords[offset].distance(hex) <= piece.range
    }

    /// Living pieces of any team that can see a hex
    pub fn witnesses(&self, hex: Hex) -> Vec<usize> {
        self.living().filter(|&o| self.can_see(o, hex)).collect()
    }

    pub fn team_sees(&self, team: usize, hex: Hex) -> bool {
        let start = self.offset(team, 0);
        (start..start + self.pieces_per_team).any(|o| self.can_see(o, hex))
    }

    /// Hexes currently revealed to a team (fog of war)
    pub fn visible_hexes(&self, team: usize) -> Vec<Hex> {
        board_hexes(self.side).filter(|&h| self.team_sees(team, h)).collect()
    }

    /// Other living pieces within a piece's visibility range
    pub fn scan_area(&self, offset: usize) -> Vec<usize> {
        self.living()
            .filter(|&o| o != offset && self.can_see(offset, self.coords[o]))
            .collect()
    }

    /// Living pieces occupying a hex
    pub fn scan_space(&self, hex: Hex) -> Vec<usize> {
        self.living().filter(|&o| self.coords[o] == hex).collect()
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    fn check_actor(&self, offset: usize) -> Result<(), ActionError> {
        if offset != self.current {
            return Err(ActionError::NotYourTurn(offset));
        }
        if !self.piece(offset).alive {
            return Err(ActionError::PieceDead(offset));
        }
        Ok(())
    }

    /// Move the acting piece to `target`
    pub fn move_piece(&mut self, offset: usize, target: Hex) -> Result<MoveOutcome, ActionError> {
        self.check_actor(offset)?;
        let target = target.reduce();
        if !target.is_in_bounds(self.side) {
            return Err(ActionError::OutOfBounds(target));
        }
        let origin = self.coords[offset];
        let distance = origin.distance(target);
        let movement = self.piece(offset).current_movement;
        if distance > movement {
            return Err(ActionError::TooFar { distance, movement });
        }

        let departure_witnesses = self.witnesses(origin);
        let facing = self.directions.absolute(origin, target).map(|d| facing_for(d, distance));

        self.coords[offset] = target;
        let piece = self.piece_mut(offset);
        piece.spend_movement(distance);
        if let Some(f) = facing {
            piece.rotate(f);
        }
        let facing = piece.facing;
        let range = piece.range;

        self.record(Event::Departed { piece: offset, hex: origin }, departure_witnesses);
        let arrival_witnesses = self.witnesses(target);
        self.record(Event::Arrived { piece: offset, hex: target, facing }, arrival_witnesses);

        let team = self.team_of(offset);
        let (visible_teammates, visible_enemies): (Vec<usize>, Vec<usize>) = self
            .scan_area(offset)
            .into_iter()
            .partition(|&o| self.team_of(o) == team);

        Ok(MoveOutcome {
            piece: offset,
            origin,
            displacement: target - origin,
            range,
            visible_teammates,
            visible_enemies,
        })
    }

    /// Fire the acting piece at `target`, damaging every occupant
    pub fn shoot_space(&mut self, offset: usize, target: Hex) -> Result<ShotOutcome, ActionError> {
        self.check_actor(offset)?;
        let target = target.reduce();
        let shooter = self.piece(offset);
        if shooter.has_shot {
            return Err(ActionError::AlreadyShot(offset));
        }
        if !target.is_in_bounds(self.side) {
            return Err(ActionError::OutOfBounds(target));
        }
        let from = self.coords[offset];
        let distance = from.distance(target);
        if distance > shooter.range {
            return Err(ActionError::OutOfRange { distance, range: shooter.range });
        }
        let attack = shooter.attack;

        let occupants = self.scan_space(target);
        let shot_witnesses = self.witnesses(from);
        let target_witnesses = self.witnesses(target);

        self.piece_mut(offset).has_shot = true;
        self.record(Event::Shot { shooter: offset, from, target }, shot_witnesses);

        for &victim in &occupants {
            let piece = self.piece_mut(victim);
            let amount = piece.take_damage(attack);
            let health_left = piece.current_health;
            let died = !piece.alive;
            self.record(
                Event::Damaged { piece: victim, hex: target, amount, health_left },
                target_witnesses.clone(),
            );
            if died {
                self.record(Event::Destroyed { piece: victim, hex: target }, target_witnesses.clone());
            }
        }

        let mut struck_teams: Vec<usize> = occupants.iter().map(|&o| self.team_of(o)).collect();
        struck_teams.dedup();
        for team in struck_teams {
            if self.teams[team].check_eliminated() {
                self.remaining_teams -= 1;
                tracing::info!("{} team eliminated, {} remaining", self.teams[team].color(), self.remaining_teams);
                let everyone = self.living().collect();
                self.record(Event::Eliminated { team }, everyone);
            }
        }

        Ok(ShotOutcome {
            shooter_hex: from,
            target_hex: target,
            hidden: occupants,
        })
    }

    /// Set the acting piece's absolute facing
    pub fn rotate_piece(&mut self, offset: usize, facing: u8) -> Result<(), ActionError> {
        self.check_actor(offset)?;
        self.piece_mut(offset).rotate(facing);
        Ok(())
    }

    // ========================================================================
    // TURN SEQUENCING
    // ========================================================================

    /// Current standing of the match
    pub fn outcome(&self) -> GameResult {
        match self.remaining_teams {
            0 => GameResult::Draw,
            1 => self
                .teams
                .iter()
                .position(|t| !t.is_eliminated())
                .map_or(GameResult::Draw, GameResult::Won),
            _ => GameResult::Ongoing,
        }
    }

    /// Next living piece after `from` in turn order.
    ///
    /// Order is team-major within a local index: every team's piece 0, then
    /// every team's piece 1, and so on. Wrapping past the last local index
    /// starts a new round.
    pub fn next_piece(&mut self, from: usize) -> Option<usize> {
        let teams = self.teams.len();
        let (mut team, mut local) = self.split(from);
        let mut wrapped = false;

        for _ in 0..self.piece_count() {
            team += 1;
            if team == teams {
                team = 0;
                local += 1;
                if local == self.pieces_per_team {
                    local = 0;
                    wrapped = true;
                }
            }
            let offset = self.offset(team, local);
            if self.piece(offset).alive {
                if wrapped {
                    self.reset_round();
                }
                return Some(offset);
            }
        }
        None
    }

    /// End the current turn. Returns the result; the turn only passes while
    /// the match is ongoing.
    pub fn advance(&mut self) -> GameResult {
        let result = self.outcome();
        if result != GameResult::Ongoing {
            return result;
        }
        match self.next_piece(self.current) {
            Some(next) => {
                tracing::debug!("Turn passes from piece {} to piece {}", self.current, next);
                self.current = next;
                GameResult::Ongoing
            }
            None => GameResult::Draw,
        }
    }

    fn reset_round(&mut self) {
        for team in &mut self.teams {
            for piece in team.pieces_mut().iter_mut().filter(|p| p.alive) {
                piece.reset_round();
            }
        }
        self.round += 1;
        let everyone = self.living().collect();
        self.record(Event::NewRound { round: self.round }, everyone);
    }

    fn record(&mut self, event: Event, witnesses: Vec<usize>) {
        tracing::debug!(?event, witnesses = witnesses.len(), "board event");
        self.journal.push(Notice { event, witnesses });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::DIRECTIONS;
    use crate::piece::PieceKind;
    use crate::team::{TeamColor, TEAM_COLORS};

    fn team(color: TeamColor) -> Team {
        Team::human(
            color,
            vec![
                Piece::new(PieceKind::Scout, 0),
                Piece::new(PieceKind::Sniper, 0),
                Piece::new(PieceKind::Tank, 0),
            ],
        )
    }

    fn two_player_board() -> Board {
        Board::new(5, vec![team(TeamColor::Red), team(TeamColor::Blue)]).unwrap()
    }

    fn fingerprint(board: &Board) -> String {
        format!("{:?}", board)
    }

    #[test]
    fn test_board_creation() {
        let board = two_player_board();
        assert_eq!(board.piece_count(), 6);
        assert_eq!(board.current(), 0);
        assert_eq!(board.remaining_teams(), 2);
        assert_eq!(board.position(0), Hex::corner(5, 0));
        assert_eq!(board.position(3), Hex::corner(5, 3));
        assert_eq!(board.piece(0).facing, 3);
        assert_eq!(board.piece(4).facing, 0);
        assert_eq!(board.outcome(), GameResult::Ongoing);
    }

    #[test]
    fn test_config_errors() {
        let err = Board::new(6, vec![team(TeamColor::Red), team(TeamColor::Blue)]).unwrap_err();
        assert_eq!(err, ConfigError::SideLength(6));

        let err = Board::new(5, vec![team(TeamColor::Red)]).unwrap_err();
        assert_eq!(err, ConfigError::PlayerCount(1));

        let four = vec![
            team(TeamColor::Red),
            team(TeamColor::Orange),
            team(TeamColor::Yellow),
            team(TeamColor::Green),
        ];
        assert_eq!(Board::new(7, four).unwrap_err(), ConfigError::PlayerCount(4));
    }

    #[test]
    fn test_six_player_corners() {
        let teams = TEAM_COLORS.iter().map(|&c| team(c)).collect();
        let board = Board::new(7, teams).unwrap();
        for t in 0..6 {
            assert_eq!(board.position(board.offset(t, 0)), Hex::corner(7, t as u8));
        }
    }

    #[test]
    fn test_move_legal() {
        let mut board = two_player_board();
        let start = board.position(0);
        let target = start + DIRECTIONS[3] * 2;

        let outcome = board.move_piece(0, target).unwrap();
        assert_eq!(board.position(0), target);
        assert_eq!(board.piece(0).current_movement, 1);
        assert_eq!(board.piece(0).facing, 3);
        assert_eq!(outcome.origin, start);
        assert_eq!(outcome.displacement, DIRECTIONS[3] * 2);
        assert_eq!(outcome.range, 2);
        // Still within range of the teammates left on the corner
        assert_eq!(outcome.visible_teammates, vec![1, 2]);
        assert!(outcome.visible_enemies.is_empty());
    }

    #[test]
    fn test_move_rejections_leave_board_unchanged() {
        let mut board = two_player_board();
        let before = fingerprint(&board);
        let start = board.position(0);

        // Off the board
        assert!(matches!(
            board.move_piece(0, start + DIRECTIONS[0]),
            Err(ActionError::OutOfBounds(_))
        ));
        // Beyond movement budget
        assert!(matches!(
            board.move_piece(0, start + DIRECTIONS[3] * 4),
            Err(ActionError::TooFar { distance: 4, movement: 3 })
        ));
        // Not this piece's turn
        assert!(board.move_piece(1, start + DIRECTIONS[3]).is_err());

        assert_eq!(fingerprint(&board), before);
    }

    #[test]
    fn test_movement_budget_accumulates() {
        let mut board = two_player_board();
        let start = board.position(0);
        board.move_piece(0, start + DIRECTIONS[3] * 2).unwrap();
        let err = board.move_piece(0, start + DIRECTIONS[3] * 4).unwrap_err();
        assert_eq!(err, ActionError::TooFar { distance: 2, movement: 1 });
    }

    #[test]
    fn test_move_events_have_witnesses() {
        let mut board = two_player_board();
        let start = board.position(0);
        board.move_piece(0, start + DIRECTIONS[3]).unwrap();

        let journal = board.journal();
        assert_eq!(journal.len(), 2);
        assert!(matches!(journal[0].event, Event::Departed { piece: 0, .. }));
        assert!(journal[0].witnesses.contains(&0));
        assert!(journal[0].witnesses.contains(&2));
        // Blue is on the far corner and sees nothing
        assert_eq!(board.feed_for(1).count(), 0);
        assert_eq!(board.feed_for(0).count(), 2);
    }

    #[test]
    fn test_shoot_empty_hex() {
        let mut board = two_player_board();
        let target = board.position(0) + DIRECTIONS[3] * 2;
        let outcome = board.shoot_space(0, target).unwrap();
        assert!(outcome.hidden.is_empty());
        assert!(board
            .journal()
            .iter()
            .all(|n| !matches!(n.event, Event::Damaged { .. })));
        assert!(board.piece(0).has_shot);
    }

    #[test]
    fn test_shoot_rejections() {
        let mut board = two_player_board();
        let before = fingerprint(&board);
        let start = board.position(0);

        assert!(matches!(
            board.shoot_space(0, start + DIRECTIONS[3] * 3),
            Err(ActionError::OutOfRange { distance: 3, range: 2 })
        ));
        assert!(matches!(
            board.shoot_space(0, start + DIRECTIONS[0]),
            Err(ActionError::OutOfBounds(_))
        ));
        assert_eq!(fingerprint(&board), before);

        board.shoot_space(0, start + DIRECTIONS[3]).unwrap();
        assert_eq!(
            board.shoot_space(0, start + DIRECTIONS[3]),
            Err(ActionError::AlreadyShot(0))
        );
    }

    #[test]
    fn test_shoot_damages_every_occupant() {
        let mut board = two_player_board();
        let target = Hex::axial(0, 0);
        board.place(0, Hex::axial(0, 1)).unwrap();
        // A stacked Blue sniper and tank, plus a Red tank
        board.place(4, target).unwrap();
        board.place(5, target).unwrap();
        board.place(2, target).unwrap();

        let outcome = board.shoot_space(0, target).unwrap();
        assert_eq!(outcome.hidden, vec![2, 4, 5]);
        assert_eq!(board.piece(4).current_health, 1);
        assert_eq!(board.piece(5).current_health, 2);
        assert_eq!(board.piece(2).current_health, 2);
        assert_eq!(board.remaining_teams(), 2);
    }

    #[test]
    fn test_elimination_counts_once() {
        let mut board = two_player_board();
        let target = Hex::axial(0, 0);
        board.place(0, Hex::axial(0, -1)).unwrap();
        for o in 3..6 {
            board.place(o, target).unwrap();
        }
        // Weaken Blue so a single scout shot finishes it
        for o in 3..6 {
            let hp = board.piece(o).current_health;
            board.piece_mut(o).take_damage(hp - 1);
        }

        board.shoot_space(0, target).unwrap();
        assert_eq!(board.team(1).living(), 0);
        assert!(board.team(1).is_eliminated());
        assert_eq!(board.remaining_teams(), 1);
        assert_eq!(board.outcome(), GameResult::Won(0));

        // Shooting the corpses again changes nothing
        board.piece_mut(0).reset_round();
        board.shoot_space(0, target).unwrap();
        assert_eq!(board.remaining_teams(), 1);
    }

    #[test]
    fn test_turn_order_and_round_reset() {
        let mut board = two_player_board();
        let start = board.position(0);
        board.move_piece(0, start + DIRECTIONS[3]).unwrap();
        board.shoot_space(0, start).unwrap();

        let order: Vec<usize> = (0..5)
            .map(|_| {
                board.advance();
                board.current()
            })
            .collect();
        assert_eq!(order, vec![3, 1, 4, 2, 5]);
        assert_eq!(board.round(), 1);
        assert_eq!(board.piece(0).current_movement, 2);

        board.advance();
        assert_eq!(board.current(), 0);
        assert_eq!(board.round(), 2);
        assert_eq!(board.piece(0).current_movement, 3);
        assert!(!board.piece(0).has_shot);
    }

    #[test]
    fn test_next_piece_skips_dead() {
        let mut board = two_player_board();
        board.piece_mut(3).take_damage(5);
        board.piece_mut(1).take_damage(5);
        assert_eq!(board.next_piece(0), Some(4));
        assert_eq!(board.next_piece(4), Some(2));
    }

    #[test]
    fn test_next_piece_single_survivor_wraps_once() {
        let mut board = two_player_board();
        for o in 1..6 {
            board.piece_mut(o).take_damage(5);
        }
        let round = board.round();
        assert_eq!(board.next_piece(0), Some(0));
        assert_eq!(board.round(), round + 1);
    }

    #[test]
    fn test_next_piece_none_alive() {
        let mut board = two_player_board();
        for o in 0..6 {
            board.piece_mut(o).take_damage(5);
        }
        assert_eq!(board.next_piece(0), None);
    }

    #[test]
    fn test_visibility() {
        let board = two_player_board();
        let corner = board.position(0);
        assert!(board.can_see(0, corner + DIRECTIONS[3] * 2));
        assert!(!board.can_see(0, corner + DIRECTIONS[3] * 3));
        assert!(board.can_see(1, corner + DIRECTIONS[3] * 3));
        assert!(board.team_sees(0, corner + DIRECTIONS[3] * 3));
        assert!(!board.team_sees(1, corner));

        let visible = board.visible_hexes(0);
        assert!(visible.contains(&corner));
        assert!(!visible.contains(&board.position(3)));
    }

    #[test]
    fn test_scan() {
        let mut board = two_player_board();
        board.place(3, Hex::axial(0, -2)).unwrap();
        assert_eq!(board.scan_area(0), vec![1, 2, 3]);
        assert_eq!(board.scan_space(Hex::corner(5, 0)), vec![0, 1, 2]);
        assert_eq!(board.scan_space(Hex::ORIGIN), Vec::<usize>::new());
    }
}
