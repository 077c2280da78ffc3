//! One hand of Truco: dealing, tricks, and the truco, envido and flor
//! sub-games, driven as a pump.
//!
//! [`Hand::play`] advances every automatic transition and stops at the next
//! point that needs outside input, returning a [`PlayInstance`] snapshot.
//! Actions are validated against the snapshot's decision id, so a stale or
//! duplicated action is rejected without touching state.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{full_deck, Card, PlayedCard};
use crate::commands::{Action, ActionKind, Command, CommandMap, Say};
use crate::deck::{Deck, ShuffleProof};
use crate::envido::{falta_envido_points, Envido, EnvidoDeclaration};
use crate::errors::EngineError;
use crate::flor::{Flor, FlorBattle, FlorEntry};
use crate::options::MatchOptions;
use crate::player::{TeamIdx, HAND_SIZE};
use crate::round::{Play, Round};
use crate::rules;
use crate::table::Table;
use crate::team::TeamPoints;
use crate::truco::Truco;
use crate::turn::TurnSequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandState {
    WaitingPlay,
    WaitingForTrucoAnswer,
    WaitingEnvidoAnswer,
    WaitingEnvidoPointsAnswer,
    WaitingFlorAnswer,
    DisplayFlorBattle,
    BeforeFinished,
    DisplayPreviousHand,
    Finished,
}

/// Why a hand ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Tricks,
    TrucoDeclined,
    /// Every player of a team folded or left.
    TeamOut,
    /// Envido or flor points already won the match.
    MatchClinched,
}

/// Points won during a hand, per team. Applied to the score only when the
/// hand finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandPoints {
    pub truco: [u16; 2],
    pub envido: [u16; 2],
    pub flor: [u16; 2],
}

impl HandPoints {
    pub fn total(&self, team: TeamIdx) -> u16 {
        self.truco[team] + self.bets(team)
    }

    /// Envido and flor points only.
    pub fn bets(&self, team: TeamIdx) -> u16 {
        self.envido[team] + self.flor[team]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtHand {
    pub seat: usize,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub state: HandState,
    pub action: ActionKind,
    /// Injected by the host (timeout) rather than chosen by the player.
    #[serde(default)]
    pub forced: bool,
}

/// Everything that happened in a finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSummary {
    pub idx: u32,
    pub forehand: usize,
    pub winner: Option<TeamIdx>,
    pub reason: Option<FinishReason>,
    pub truco_value: u8,
    pub points: HandPoints,
    pub envido_winner: Option<TeamIdx>,
    pub flor_winner: Option<TeamIdx>,
    pub proof: ShuffleProof,
    /// Cards per seat in dealing order.
    pub dealt: Vec<DealtHand>,
    pub tricks: Vec<Vec<Play>>,
    pub actions: Vec<ActionRecord>,
}

/// Snapshot handed to whoever must decide next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInstance {
    pub decision_id: u64,
    pub hand_idx: u32,
    pub state: HandState,
    /// Seat whose decision this is.
    pub seat: usize,
    pub team: TeamIdx,
    pub forehand: usize,
    pub cards: Vec<Card>,
    pub can_play: bool,
    pub can_burn: bool,
    /// Legal commands for every seat that may speak now.
    pub commands: CommandMap,
    /// Envido numbers `seat` may declare (points phase only).
    pub envido_options: Vec<u8>,
    pub envido_leader: Option<EnvidoDeclaration>,
    pub truco_value: u8,
    pub trick: Vec<Play>,
    /// Results of completed tricks, `None` for ties.
    pub tricks: Vec<Option<TeamIdx>>,
    /// The current trick's best card can no longer be beaten.
    pub unbeatable: bool,
    pub scores: [TeamPoints; 2],
    pub match_point: u8,
}

impl PlayInstance {
    pub fn commands_for(&self, seat: usize) -> Vec<Command> {
        self.commands
            .get(&seat)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn can_say(&self, command: Command) -> bool {
        self.commands
            .get(&self.seat)
            .is_some_and(|s| s.contains(&command))
    }

    /// Every legal action for the deciding seat.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut out = Vec::new();
        if self.can_play {
            for (i, &c) in self.cards.iter().enumerate() {
                out.push(Action::play(self.seat, i, c));
                if self.can_burn {
                    out.push(Action::burn(self.seat, i, c));
                }
            }
        }
        for &p in &self.envido_options {
            out.push(Action::say(self.seat, Say::Points(p)));
        }
        for c in self.commands_for(self.seat) {
            out.push(Action::say(self.seat, c));
        }
        out
    }
}

/// Result of pumping a hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandStep {
    Decision(PlayInstance),
    FlorBattle(FlorBattle),
    Finished(HandSummary),
}

#[derive(Debug, Clone)]
pub struct Hand {
    idx: u32,
    options: MatchOptions,
    forehand: usize,
    state: HandState,
    round: Round,
    history: Vec<Round>,
    trick_turns: TurnSequence,
    truco: Truco,
    envido: Envido,
    flor: Flor,
    points: HandPoints,
    trick_winner: Option<TeamIdx>,
    winner: Option<TeamIdx>,
    reason: Option<FinishReason>,
    battle: Option<FlorBattle>,
    proof: ShuffleProof,
    dealt: Vec<DealtHand>,
    actions: Vec<ActionRecord>,
    decision_id: u64,
}

impl Hand {
    /// Shuffles and deals a new hand at the table's current forehand.
    pub fn new(
        idx: u32,
        table: &mut Table,
        deck: &mut Deck,
        block_hash: &str,
        options: MatchOptions,
        decision_id: u64,
    ) -> Result<Self, EngineError> {
        let proof = deck.shuffle(table.forehand_idx(), block_hash)?;
        let order = deal_order(table);
        let mut cards = vec![Vec::with_capacity(HAND_SIZE); order.len()];
        for _ in 0..HAND_SIZE {
            for hand in cards.iter_mut() {
                hand.push(deck.deal_card().ok_or(EngineError::DeckExhausted)?);
            }
        }
        let deal = order.into_iter().zip(cards).collect();
        Self::with_deal(idx, table, deal, proof, options, decision_id)
    }

    /// Starts a hand from a pre-arranged deal. Seats missing from `deal` get
    /// no cards.
    pub fn with_deal(
        idx: u32,
        table: &mut Table,
        deal: Vec<(usize, Vec<Card>)>,
        proof: ShuffleProof,
        options: MatchOptions,
        decision_id: u64,
    ) -> Result<Self, EngineError> {
        for seat in 0..table.seats() {
            table.player_mut(seat)?.clear_cards();
        }
        let mut dealt = Vec::with_capacity(deal.len());
        for (seat, cards) in deal {
            table.player_mut(seat)?.deal(cards.clone());
            dealt.push(DealtHand { seat, cards });
        }
        let forehand = table.forehand_idx();
        let mut hand = Self {
            idx,
            options,
            forehand,
            state: HandState::WaitingPlay,
            round: Round::new(),
            history: Vec::new(),
            trick_turns: TurnSequence::new(table.seats_from(forehand)),
            truco: Truco::new(),
            envido: Envido::new(),
            flor: Flor::new(),
            points: HandPoints::default(),
            trick_winner: None,
            winner: None,
            reason: None,
            battle: None,
            proof,
            dealt,
            actions: Vec::new(),
            decision_id,
        };
        info!(hand = idx, forehand, "hand dealt");
        hand.advance(table);
        Ok(hand)
    }

    pub fn idx(&self) -> u32 {
        self.idx
    }

    pub fn state(&self) -> HandState {
        self.state
    }

    pub fn forehand(&self) -> usize {
        self.forehand
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn truco(&self) -> &Truco {
        &self.truco
    }

    pub fn envido(&self) -> &Envido {
        &self.envido
    }

    pub fn flor(&self) -> &Flor {
        &self.flor
    }

    /// The trick in progress.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Completed tricks.
    pub fn history(&self) -> &[Round] {
        &self.history
    }

    pub fn is_first_trick(&self) -> bool {
        self.history.is_empty()
    }

    pub fn points(&self) -> &HandPoints {
        &self.points
    }

    pub fn winner(&self) -> Option<TeamIdx> {
        self.winner
    }

    pub fn decision_id(&self) -> u64 {
        self.decision_id
    }

    pub fn proof(&self) -> &ShuffleProof {
        &self.proof
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// No more actions are accepted.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.state,
            HandState::BeforeFinished | HandState::DisplayPreviousHand | HandState::Finished
        )
    }

    fn is_displaying(&self) -> bool {
        self.state == HandState::DisplayFlorBattle || self.is_settled()
    }

    /// Seat that owns the current decision point.
    pub fn current_seat(&self, table: &Table) -> Option<usize> {
        let active = |s: usize| table.is_active(s);
        match self.state {
            HandState::WaitingPlay => self
                .trick_turns
                .current(|s| active(s) && !self.round.has_played(s)),
            HandState::WaitingForTrucoAnswer => self.truco.turn().current(active),
            HandState::WaitingEnvidoAnswer => self.envido.turn().current(active),
            HandState::WaitingEnvidoPointsAnswer => self.envido.turn().current(active),
            HandState::WaitingFlorAnswer => {
                let answering = self.flor.answering_team();
                self.flor.turn().current(|s| {
                    active(s) && (answering == Some(s % 2) || !self.flor.has_declared(s))
                })
            }
            _ => None,
        }
    }

    /// Advances automatic transitions and returns what happens next.
    pub fn play(&mut self, table: &mut Table) -> HandStep {
        loop {
            match self.state {
                HandState::DisplayFlorBattle => {
                    self.state = self.derive_state();
                    self.advance(table);
                    if let Some(battle) = self.battle.take() {
                        return HandStep::FlorBattle(battle);
                    }
                }
                HandState::BeforeFinished => {
                    self.state = HandState::DisplayPreviousHand;
                    return HandStep::Finished(self.summary());
                }
                HandState::DisplayPreviousHand | HandState::Finished => {
                    return HandStep::Finished(self.summary());
                }
                _ => {
                    self.advance(table);
                    if let Some(seat) = self.current_seat(table) {
                        return HandStep::Decision(self.instance(table, seat));
                    }
                }
            }
        }
    }

    /// Marks the summary as consumed.
    pub fn close(&mut self) {
        self.state = HandState::Finished;
    }

    pub fn act(&mut self, table: &mut Table, id: u64, action: Action) -> Result<(), EngineError> {
        match action.kind {
            ActionKind::Play { card_idx, card } => self
                .use_card(table, id, action.seat, card_idx, card, false)
                .map(|_| ()),
            ActionKind::Burn { card_idx, card } => self
                .use_card(table, id, action.seat, card_idx, card, true)
                .map(|_| ()),
            ActionKind::Say { say } => self.say(table, id, action.seat, say).map(|_| ()),
        }
    }

    /// Plays the card at `card_idx`, face down when `burnt` (second trick
    /// onwards only).
    pub fn use_card(
        &mut self,
        table: &mut Table,
        id: u64,
        seat: usize,
        card_idx: usize,
        card: Card,
        burnt: bool,
    ) -> Result<PlayedCard, EngineError> {
        self.check_decision(id)?;
        self.ensure_can_play(table, seat, burnt)?;
        let state = self.state;
        if rules::flor_pending(self, table, seat) {
            // Playing past an undeclared flor declares it.
            let player = table.player(seat)?;
            player.check_card(card_idx, card)?;
            let team = player.team;
            self.say_flor(table, seat, team)?;
            debug!(hand = self.idx, seat, "flor declared by playing");
        }
        let played = self.play_card(table, seat, card_idx, card, burnt)?;
        let action = if burnt {
            ActionKind::Burn { card_idx, card }
        } else {
            ActionKind::Play { card_idx, card }
        };
        self.record(seat, state, action, false);
        self.advance(table);
        Ok(played)
    }

    pub fn say(&mut self, table: &mut Table, id: u64, seat: usize, say: Say) -> Result<Say, EngineError> {
        self.check_decision(id)?;
        let state = self.state;
        self.apply_say(table, seat, say)?;
        self.record(seat, state, ActionKind::Say { say }, false);
        self.advance(table);
        Ok(say)
    }

    /// Answers for `seat` after a timeout: declines a pending bet, declares a
    /// pending flor, gives up the envido, or folds. Skips the decision id
    /// check.
    pub fn force_fold(&mut self, table: &mut Table, seat: usize) -> Result<Say, EngineError> {
        if self.is_settled() {
            return Err(EngineError::NoActiveHand);
        }
        let legal = rules::legal_commands(self, table);
        let has = |c: Command| legal.get(&seat).is_some_and(|s| s.contains(&c));
        let say = if has(Command::Flor) {
            Say::Command(Command::Flor)
        } else if has(Command::NoQuiero) {
            Say::Command(Command::NoQuiero)
        } else if has(Command::SonBuenas) {
            Say::Command(Command::SonBuenas)
        } else if self.state == HandState::WaitingEnvidoPointsAnswer
            && self.current_seat(table) == Some(seat)
        {
            let lowest = table.player(seat)?.envido_options().last().copied();
            Say::Points(lowest.unwrap_or(0))
        } else if has(Command::MeVoyAlMazo) {
            Say::Command(Command::MeVoyAlMazo)
        } else {
            return Err(EngineError::IllegalAction {
                seat,
                command: Command::MeVoyAlMazo,
            });
        };
        let state = self.state;
        self.apply_say(table, seat, say)?;
        info!(hand = self.idx, seat, ?say, "forced answer");
        self.record(seat, state, ActionKind::Say { say }, true);
        self.advance(table);
        Ok(say)
    }

    /// Removes an abandoned seat from the rest of the hand.
    pub fn abandon(&mut self, table: &mut Table, seat: usize) -> Result<(), EngineError> {
        table.player_mut(seat)?.abandon();
        if !self.is_settled() {
            self.decision_id += 1;
            self.advance(table);
        }
        Ok(())
    }

    pub fn summary(&self) -> HandSummary {
        let mut tricks: Vec<Vec<Play>> = self.history.iter().map(|r| r.plays().to_vec()).collect();
        if !self.round.plays().is_empty() {
            tricks.push(self.round.plays().to_vec());
        }
        HandSummary {
            idx: self.idx,
            forehand: self.forehand,
            winner: self.winner,
            reason: self.reason,
            truco_value: self.truco.value(),
            points: self.points,
            envido_winner: self.envido.winner(),
            flor_winner: self.flor.winner(),
            proof: self.proof.clone(),
            dealt: self.dealt.clone(),
            tricks,
            actions: self.actions.clone(),
        }
    }

    fn check_decision(&self, id: u64) -> Result<(), EngineError> {
        if self.is_settled() {
            return Err(EngineError::NoActiveHand);
        }
        if id != self.decision_id {
            return Err(EngineError::StaleDecision {
                given: id,
                current: Some(self.decision_id),
            });
        }
        Ok(())
    }

    fn record(&mut self, seat: usize, state: HandState, action: ActionKind, forced: bool) {
        self.actions.push(ActionRecord {
            seat,
            state,
            action,
            forced,
        });
        self.decision_id += 1;
    }

    fn ensure_can_play(&self, table: &Table, seat: usize, burnt: bool) -> Result<(), EngineError> {
        if self.state != HandState::WaitingPlay {
            return Err(EngineError::IllegalPlay { seat });
        }
        match self.current_seat(table) {
            Some(s) if s == seat => {}
            Some(expected) => {
                return Err(EngineError::NotPlayersTurn {
                    expected,
                    actual: seat,
                })
            }
            None => return Err(EngineError::IllegalPlay { seat }),
        }
        if burnt && self.is_first_trick() {
            return Err(EngineError::IllegalPlay { seat });
        }
        Ok(())
    }

    fn play_card(
        &mut self,
        table: &mut Table,
        seat: usize,
        card_idx: usize,
        card: Card,
        burnt: bool,
    ) -> Result<PlayedCard, EngineError> {
        let player = table.player_mut(seat)?;
        let team = player.team;
        let card = player.take_card(card_idx, card)?;
        let played = if burnt {
            PlayedCard::Burnt
        } else {
            PlayedCard::Face(card)
        };
        let unseen = self.unseen_max(played);
        self.round.use_card(Play { seat, team, card: played }, unseen);
        self.trick_turns.consume(seat);
        debug!(hand = self.idx, seat, card = %played, "card played");
        Ok(played)
    }

    /// Strongest card not shown face up so far, counting `latest`.
    fn unseen_max(&self, latest: PlayedCard) -> Option<u8> {
        let seen: Vec<Card> = self
            .history
            .iter()
            .chain(std::iter::once(&self.round))
            .flat_map(|r| r.plays().iter().filter_map(|p| p.card.card()))
            .chain(latest.card())
            .collect();
        full_deck()
            .into_iter()
            .filter(|c| !seen.contains(c))
            .map(|c| c.strength())
            .max()
    }

    fn apply_say(&mut self, table: &mut Table, seat: usize, say: Say) -> Result<(), EngineError> {
        table.player(seat)?;
        match say {
            Say::Points(points) => self.declare_points(table, seat, Some(points)),
            Say::Command(command) => {
                let legal = rules::legal_commands(self, table);
                if !legal.get(&seat).is_some_and(|s| s.contains(&command)) {
                    return Err(EngineError::IllegalAction { seat, command });
                }
                self.apply_command(table, seat, command)
            }
        }
    }

    fn declare_points(
        &mut self,
        table: &mut Table,
        seat: usize,
        points: Option<u8>,
    ) -> Result<(), EngineError> {
        if self.state != HandState::WaitingEnvidoPointsAnswer {
            return Err(EngineError::EnvidoNotAccepted);
        }
        match self.current_seat(table) {
            Some(s) if s == seat => {}
            Some(expected) => {
                return Err(EngineError::NotPlayersTurn {
                    expected,
                    actual: seat,
                })
            }
            None => return Err(EngineError::EnvidoNotAccepted),
        }
        let flor_pending = rules::flor_pending(self, table, seat);
        let player = table.player_mut(seat)?;
        if let Some(p) = points {
            if flor_pending || !player.envido_options().contains(&p) {
                return Err(EngineError::InvalidEnvidoPoints { seat, points: p });
            }
        }
        player.has_said_envido_points = true;
        let team = player.team;
        self.envido.declare(seat, team, points);
        debug!(hand = self.idx, seat, ?points, "envido points");
        Ok(())
    }

    fn apply_command(
        &mut self,
        table: &mut Table,
        seat: usize,
        command: Command,
    ) -> Result<(), EngineError> {
        let team = table.player(seat)?.team;
        debug!(hand = self.idx, seat, %command, "command");
        match command {
            Command::Flor => self.say_flor(table, seat, team)?,
            Command::Contraflor | Command::ContraflorAlResto => {
                table.player_mut(seat)?.has_said_flor = true;
                let answerers = self.flor_holders(table, 1 - team, false);
                self.flor.raise(command, seat, team, answerers);
            }
            Command::Truco | Command::ReTruco | Command::ValeCuatro => {
                table.player_mut(seat)?.has_said_truco = true;
                let answerers = self.answer_order(table, 1 - team);
                self.truco.raise(team, answerers);
            }
            Command::Envido | Command::RealEnvido | Command::FaltaEnvido => {
                let answerers = self.answer_order(table, 1 - team);
                self.envido.say(command, team, answerers);
            }
            Command::Quiero => match self.state {
                HandState::WaitingForTrucoAnswer => self.truco.accept(),
                HandState::WaitingEnvidoAnswer => {
                    let order = self.active_order(table);
                    self.envido.accept(order);
                }
                HandState::WaitingFlorAnswer => {
                    table.player_mut(seat)?.has_said_flor = true;
                    self.flor.accept(seat);
                    self.flor_battle(table)?;
                }
                _ => {}
            },
            Command::NoQuiero => match self.state {
                HandState::WaitingForTrucoAnswer => {
                    self.truco.decline();
                    for s in 0..table.seats() {
                        if s % 2 == team {
                            table.player_mut(s)?.disable();
                        }
                    }
                }
                HandState::WaitingEnvidoAnswer => {
                    self.envido.decline();
                    self.credit_envido();
                }
                HandState::WaitingFlorAnswer => {
                    self.flor.decline();
                    self.close_flor(table);
                }
                _ => {}
            },
            Command::SonBuenas => self.declare_points(table, seat, None)?,
            Command::MeVoyAlMazo => {
                table.player_mut(seat)?.disable();
                info!(hand = self.idx, seat, "player folded");
            }
        }
        Ok(())
    }

    fn say_flor(&mut self, table: &mut Table, seat: usize, team: TeamIdx) -> Result<(), EngineError> {
        let player = table.player_mut(seat)?;
        if !player.has_flor() {
            return Err(EngineError::NoFlor(seat));
        }
        player.has_said_flor = true;
        if self.envido.is_pending() {
            self.envido.cancel();
            info!(hand = self.idx, seat, "envido cancelled by flor");
        }
        if self.flor.is_started() {
            self.flor.declare(seat, team, Vec::new(), Vec::new());
        } else {
            let answerers = self.flor_holders(table, 1 - team, true);
            let pending = self.flor_holders(table, team, true);
            self.flor.declare(seat, team, answerers, pending);
        }
        Ok(())
    }

    /// Active flor holders of `team`, forehand first.
    fn flor_holders(&self, table: &Table, team: TeamIdx, undeclared_only: bool) -> Vec<usize> {
        table
            .forehand_first()
            .into_iter()
            .filter(|&s| s % 2 == team)
            .filter(|&s| {
                table.player(s).is_ok_and(|p| {
                    p.is_active() && p.has_flor() && !(undeclared_only && p.has_said_flor)
                })
            })
            .collect()
    }

    /// Active seats of `team` in answering order: forehand first, seats with
    /// a pending flor last.
    fn answer_order(&self, table: &Table, team: TeamIdx) -> Vec<usize> {
        let (mut first, last): (Vec<usize>, Vec<usize>) = table
            .forehand_first()
            .into_iter()
            .filter(|&s| s % 2 == team && table.is_active(s))
            .partition(|&s| !rules::flor_pending(self, table, s));
        first.extend(last);
        first
    }

    fn active_order(&self, table: &Table) -> Vec<usize> {
        table
            .forehand_first()
            .into_iter()
            .filter(|&s| table.is_active(s))
            .collect()
    }

    fn flor_battle(&mut self, table: &mut Table) -> Result<(), EngineError> {
        let mut entries = Vec::new();
        for seat in self.active_order(table) {
            let player = table.player_mut(seat)?;
            if let Some(points) = player.flor_points() {
                player.has_said_flor = true;
                entries.push(FlorEntry {
                    seat,
                    team: player.team,
                    points,
                });
            }
        }
        let Some(provisional) = FlorBattle::resolve(entries, 0) else {
            self.flor.finish_unopposed();
            self.close_flor(table);
            return Ok(());
        };
        let loser = 1 - provisional.winner.team;
        let mp = u16::from(self.options.match_point);
        let resto = (2 * mp)
            .saturating_sub(table.team(loser).points().total())
            .max(1);
        let battle = FlorBattle {
            stake: self.flor.accept_stake(resto),
            ..provisional
        };
        self.flor.finish_battle(&battle);
        self.points.flor[battle.winner.team] += battle.stake;
        info!(
            hand = self.idx,
            winner = battle.winner.seat,
            stake = battle.stake,
            "flor battle"
        );
        self.battle = Some(battle);
        self.state = HandState::DisplayFlorBattle;
        Ok(())
    }

    fn close_flor(&mut self, table: &mut Table) {
        for team in 0..2 {
            for player in table.team_mut(team).players_mut() {
                if player.has_flor() {
                    player.has_said_flor = true;
                }
            }
        }
        if let Some(winner) = self.flor.winner() {
            self.points.flor[winner] += self.flor.stake();
            info!(hand = self.idx, team = winner, stake = self.flor.stake(), "flor settled");
        }
    }

    fn credit_envido(&mut self) {
        if let Some(winner) = self.envido.winner() {
            self.points.envido[winner] += self.envido.stake();
            info!(hand = self.idx, team = winner, stake = self.envido.stake(), "envido settled");
        }
    }

    fn derive_state(&self) -> HandState {
        if self.flor.is_pending() {
            HandState::WaitingFlorAnswer
        } else if self.envido.is_pending() {
            if self.envido.is_accepted() {
                HandState::WaitingEnvidoPointsAnswer
            } else {
                HandState::WaitingEnvidoAnswer
            }
        } else if self.truco.is_waiting_answer() {
            HandState::WaitingForTrucoAnswer
        } else {
            HandState::WaitingPlay
        }
    }

    /// Runs automatic transitions until someone must decide, a display state
    /// is reached, or the hand is settled.
    fn advance(&mut self, table: &mut Table) {
        loop {
            if self.is_displaying() {
                return;
            }
            if let Some((winner, reason)) = self.check_finished(table) {
                self.finish(winner, reason);
                return;
            }
            self.state = self.derive_state();
            if self.current_seat(table).is_some() {
                return;
            }
            self.resolve_stalled(table);
        }
    }

    fn check_finished(&self, table: &Table) -> Option<(TeamIdx, FinishReason)> {
        if let Some(team) = self.truco.declined_by() {
            return Some((1 - team, FinishReason::TrucoDeclined));
        }
        if !self.envido.is_pending() && !self.flor.is_pending() {
            for team in 0..2 {
                if table.team(team).is_all_disabled() {
                    return Some((1 - team, FinishReason::TeamOut));
                }
            }
        }
        if let Some(team) = self.trick_winner {
            return Some((team, FinishReason::Tricks));
        }
        let mp = self.options.match_point;
        (0..2)
            .find(|&t| self.points.bets(t) > 0 && table.team(t).would_win(self.points.bets(t), mp))
            .map(|t| (t, FinishReason::MatchClinched))
    }

    fn finish(&mut self, winner: TeamIdx, reason: FinishReason) {
        self.winner = Some(winner);
        self.reason = Some(reason);
        if reason != FinishReason::MatchClinched {
            self.points.truco[winner] += u16::from(self.truco.value());
        }
        self.state = HandState::BeforeFinished;
        info!(
            hand = self.idx,
            team = winner,
            ?reason,
            points = self.points.total(winner),
            "hand finished"
        );
    }

    /// Progress when the current state has nobody left to act.
    fn resolve_stalled(&mut self, table: &mut Table) {
        match self.state {
            HandState::WaitingPlay => self.complete_trick(table),
            HandState::WaitingForTrucoAnswer => {
                self.truco.decline();
            }
            HandState::WaitingEnvidoAnswer => {
                self.envido.decline();
                self.credit_envido();
            }
            HandState::WaitingEnvidoPointsAnswer => {
                let falta = falta_envido_points(table, &self.options);
                self.envido.finish(falta);
                self.credit_envido();
            }
            HandState::WaitingFlorAnswer => {
                if self.flor.is_waiting_answer() {
                    self.flor.decline();
                } else {
                    self.flor.finish_unopposed();
                }
                self.close_flor(table);
            }
            _ => {}
        }
    }

    fn complete_trick(&mut self, table: &Table) {
        let round = mem::take(&mut self.round);
        let leader = match round.result() {
            Some(_) => round.winner().map_or(self.forehand, |w| w.seat),
            None => self.forehand,
        };
        debug!(hand = self.idx, trick = self.history.len() + 1, winner = ?round.result(), "trick complete");
        self.history.push(round);
        let results: Vec<Option<TeamIdx>> = self.history.iter().map(Round::result).collect();
        if let Some(team) = rules::hand_winner(&results, self.forehand % 2) {
            self.trick_winner = Some(team);
            return;
        }
        self.trick_turns = TurnSequence::new(table.seats_from(leader));
    }

    fn instance(&self, table: &Table, seat: usize) -> PlayInstance {
        let player = table.player(seat).ok();
        let flor_pending = rules::flor_pending(self, table, seat);
        let can_play = self.state == HandState::WaitingPlay;
        let envido_options = match player {
            Some(p) if self.state == HandState::WaitingEnvidoPointsAnswer && !flor_pending => {
                p.envido_options().to_vec()
            }
            _ => Vec::new(),
        };
        PlayInstance {
            decision_id: self.decision_id,
            hand_idx: self.idx,
            state: self.state,
            seat,
            team: seat % 2,
            forehand: self.forehand,
            cards: player.map(|p| p.hand().to_vec()).unwrap_or_default(),
            can_play,
            can_burn: can_play && !self.is_first_trick(),
            commands: rules::legal_commands(self, table),
            envido_options,
            envido_leader: self.envido.leader(),
            truco_value: self.truco.value(),
            trick: self.round.plays().to_vec(),
            tricks: self.history.iter().map(Round::result).collect(),
            unbeatable: self.round.is_unbeatable(),
            scores: [table.team(0).points(), table.team(1).points()],
            match_point: self.options.match_point,
        }
    }
}

/// Seats that receive cards, forehand first.
fn deal_order(table: &Table) -> Vec<usize> {
    table
        .forehand_first()
        .into_iter()
        .filter(|&s| table.player(s).is_ok_and(|p| !p.abandoned))
        .collect()
}
