//! Pairwise comparison flow leading to a single vote.
//!
//! The user holds a "current choice" and is shown one new proposal at a
//! time. Each accept or reject spends one comparison; when the budget for
//! the mode runs out, or a project gets a super-like, the flow moves to the
//! final confirmation.
//!
//! # Invariants
//! - `remaining` never exceeds `mode.max_comparisons()` and only decreases.
//! - A project is proposed at most once per session.
//! - In `Phase::FinalChoice` a final choice is always set.

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ComparisonMode, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Current,
    Proposal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Comparing,
    FinalChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error("select at least one theme before comparing projects")]
    NoThemesSelected,
    #[error("no projects match your themes; try other themes")]
    NotEnoughCandidates,
    #[error("that action is not available at this point")]
    NotAllowed,
}

#[derive(Debug, Clone)]
pub struct ComparisonSession {
    mode: ComparisonMode,
    candidates: Vec<Project>,
    current: Project,
    proposal: Option<Project>,
    viewed: Vec<String>,
    liked: Vec<String>,
    disliked: Vec<String>,
    remaining: u32,
    final_choice: Option<Project>,
    phase: Phase,
}

impl ComparisonSession {
    /// `candidates` is the recommended list for `selected_themes`, in order.
    pub fn start(
        mode: ComparisonMode,
        selected_themes: &[String],
        candidates: Vec<Project>,
    ) -> Result<Self, ComparisonError> {
        if selected_themes.is_empty() {
            return Err(ComparisonError::NoThemesSelected);
        }
        if candidates.len() < 2 {
            return Err(ComparisonError::NotEnoughCandidates);
        }

        let current = candidates[0].clone();
        let proposal = candidates[1].clone();
        let viewed = vec![current.id.clone(), proposal.id.clone()];

        info!(
            mode = mode.label(),
            candidates = candidates.len(),
            "comparison started"
        );

        Ok(Self {
            mode,
            candidates,
            current,
            proposal: Some(proposal),
            viewed,
            liked: Vec::new(),
            disliked: Vec::new(),
            remaining: mode.max_comparisons(),
            final_choice: None,
            phase: Phase::Comparing,
        })
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> &Project {
        &self.current
    }

    pub fn proposal(&self) -> Option<&Project> {
        self.proposal.as_ref()
    }

    pub fn final_choice(&self) -> Option<&Project> {
        self.final_choice.as_ref()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn comparisons_made(&self) -> u32 {
        self.mode.max_comparisons() - self.remaining
    }

    pub fn liked(&self) -> &[String] {
        &self.liked
    }

    pub fn disliked(&self) -> &[String] {
        &self.disliked
    }

    fn next_unviewed(&self) -> Option<Project> {
        self.candidates
            .iter()
            .find(|p| !self.viewed.contains(&p.id) && p.id != self.current.id)
            .cloned()
    }

    /// Pulls the next proposal. Running out of candidates ends the flow on
    /// the current choice.
    fn advance(&mut self) {
        match self.next_unviewed() {
            Some(next) => {
                debug!(project_id = %next.id, "next proposal");
                self.viewed.push(next.id.clone());
                self.proposal = Some(next);
            }
            None => {
                debug!("no candidates left");
                self.proposal = None;
                self.show_final(self.current.clone());
            }
        }
    }

    fn show_final(&mut self, choice: Project) {
        self.final_choice = Some(choice);
        self.phase = Phase::FinalChoice;
    }

    fn spend_comparison(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            let choice = self.final_choice.clone().unwrap_or_else(|| self.current.clone());
            self.show_final(choice);
        } else {
            self.advance();
        }
    }

    /// Keep the proposal: it replaces the current choice.
    pub fn accept(&mut self) -> Result<Phase, ComparisonError> {
        if self.phase != Phase::Comparing {
            return Err(ComparisonError::NotAllowed);
        }
        let proposal = self.proposal.take().ok_or(ComparisonError::NotAllowed)?;

        self.liked.push(self.current.id.clone());
        self.current = proposal.clone();
        self.final_choice = Some(proposal);
        self.spend_comparison();
        Ok(self.phase)
    }

    /// Drop the proposal and keep the current choice.
    pub fn reject(&mut self) -> Result<Phase, ComparisonError> {
        if self.phase != Phase::Comparing {
            return Err(ComparisonError::NotAllowed);
        }
        let proposal = self.proposal.take().ok_or(ComparisonError::NotAllowed)?;

        self.disliked.push(proposal.id);
        self.final_choice = Some(self.current.clone());
        self.spend_comparison();
        Ok(self.phase)
    }

    /// Jump straight to confirmation with the chosen side.
    pub fn super_like(&mut self, side: Side) -> Result<(), ComparisonError> {
        if self.phase != Phase::Comparing {
            return Err(ComparisonError::NotAllowed);
        }
        let choice = match side {
            Side::Current => {
                self.liked.push(self.current.id.clone());
                self.current.clone()
            }
            Side::Proposal => {
                let proposal = self.proposal.take().ok_or(ComparisonError::NotAllowed)?;
                self.current = proposal.clone();
                proposal
            }
        };
        info!(project_id = %choice.id, "super like");
        self.show_final(choice);
        Ok(())
    }

    pub fn can_finalize(&self) -> bool {
        self.phase == Phase::Comparing
            && self.remaining > 0
            && self.comparisons_made() >= self.mode.min_before_choice()
    }

    /// Settle on the current choice before the budget runs out.
    pub fn finalize(&mut self) -> Result<(), ComparisonError> {
        if !self.can_finalize() {
            return Err(ComparisonError::NotAllowed);
        }
        self.show_final(self.current.clone());
        Ok(())
    }

    pub fn can_continue(&self) -> bool {
        self.phase == Phase::FinalChoice
            && self.remaining > 0
            && self.next_unviewed().is_some()
    }

    /// Back from the confirmation to comparing, with a fresh proposal.
    pub fn continue_comparing(&mut self) -> Result<(), ComparisonError> {
        if !self.can_continue() {
            return Err(ComparisonError::NotAllowed);
        }
        self.phase = Phase::Comparing;
        // an unanswered proposal stays viewed and is not offered again
        self.proposal = None;
        self.advance();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn candidates(count: usize) -> Vec<Project> {
        let template = seed::projects().remove(0);
        (1..=count)
            .map(|i| Project {
                id: format!("p{i}"),
                title: format!("Project {i}"),
                ..template.clone()
            })
            .collect()
    }

    fn themes() -> Vec<String> {
        vec!["1".to_string()]
    }

    fn session(mode: ComparisonMode, count: usize) -> ComparisonSession {
        ComparisonSession::start(mode, &themes(), candidates(count)).unwrap()
    }

    #[test]
    fn start_needs_themes_and_two_candidates() {
        assert_eq!(
            ComparisonSession::start(ComparisonMode::Easy, &[], candidates(5)).unwrap_err(),
            ComparisonError::NoThemesSelected
        );
        assert_eq!(
            ComparisonSession::start(ComparisonMode::Easy, &themes(), candidates(1)).unwrap_err(),
            ComparisonError::NotEnoughCandidates
        );
    }

    #[test]
    fn starts_with_first_two_candidates() {
        let s = session(ComparisonMode::Easy, 6);

        assert_eq!(s.current().id, "p1");
        assert_eq!(s.proposal().unwrap().id, "p2");
        assert_eq!(s.remaining(), 5);
        assert_eq!(s.phase(), Phase::Comparing);
        assert!(s.final_choice().is_none());
    }

    #[test]
    fn accept_promotes_the_proposal() {
        let mut s = session(ComparisonMode::Easy, 6);

        assert_eq!(s.accept().unwrap(), Phase::Comparing);

        assert_eq!(s.current().id, "p2");
        assert_eq!(s.final_choice().unwrap().id, "p2");
        assert_eq!(s.liked(), ["p1"]);
        assert_eq!(s.proposal().unwrap().id, "p3");
        assert_eq!(s.remaining(), 4);
    }

    #[test]
    fn reject_keeps_the_current_choice() {
        let mut s = session(ComparisonMode::Easy, 6);

        s.reject().unwrap();

        assert_eq!(s.current().id, "p1");
        assert_eq!(s.disliked(), ["p2"]);
        assert_eq!(s.proposal().unwrap().id, "p3");
    }

    #[test]
    fn easy_mode_ends_after_five_comparisons() {
        let mut s = session(ComparisonMode::Easy, 20);

        for _ in 0..4 {
            assert_eq!(s.reject().unwrap(), Phase::Comparing);
        }
        assert_eq!(s.accept().unwrap(), Phase::FinalChoice);

        assert_eq!(s.remaining(), 0);
        assert_eq!(s.final_choice().unwrap().id, "p6");
        assert!(!s.can_continue());
        assert_eq!(s.reject().unwrap_err(), ComparisonError::NotAllowed);
    }

    #[test]
    fn expert_mode_allows_fifteen_comparisons() {
        let mut s = session(ComparisonMode::Expert, 30);

        for _ in 0..14 {
            s.reject().unwrap();
        }
        assert_eq!(s.phase(), Phase::Comparing);
        assert_eq!(s.reject().unwrap(), Phase::FinalChoice);
        assert_eq!(s.final_choice().unwrap().id, "p1");
    }

    #[test]
    fn running_out_of_candidates_settles_on_current() {
        let mut s = session(ComparisonMode::Easy, 3);

        s.accept().unwrap();
        assert_eq!(s.proposal().unwrap().id, "p3");
        assert_eq!(s.reject().unwrap(), Phase::FinalChoice);

        assert_eq!(s.final_choice().unwrap().id, "p2");
        assert_eq!(s.remaining(), 3);
        assert!(!s.can_continue());
    }

    #[test]
    fn proposals_are_never_repeated() {
        let mut s = session(ComparisonMode::Expert, 8);
        let mut seen = vec![s.proposal().unwrap().id.clone()];

        while s.phase() == Phase::Comparing {
            s.reject().unwrap();
            if let Some(p) = s.proposal() {
                assert!(!seen.contains(&p.id));
                seen.push(p.id.clone());
            }
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn super_like_on_proposal_ends_the_flow() {
        let mut s = session(ComparisonMode::Easy, 6);

        s.super_like(Side::Proposal).unwrap();

        assert_eq!(s.phase(), Phase::FinalChoice);
        assert_eq!(s.current().id, "p2");
        assert_eq!(s.final_choice().unwrap().id, "p2");
        assert_eq!(s.remaining(), 5);
    }

    #[test]
    fn super_like_on_current_records_a_like() {
        let mut s = session(ComparisonMode::Easy, 6);

        s.super_like(Side::Current).unwrap();

        assert_eq!(s.liked(), ["p1"]);
        assert_eq!(s.final_choice().unwrap().id, "p1");
    }

    #[test]
    fn continue_after_super_like_brings_a_new_proposal() {
        let mut s = session(ComparisonMode::Easy, 6);
        s.super_like(Side::Proposal).unwrap();

        assert!(s.can_continue());
        s.continue_comparing().unwrap();

        assert_eq!(s.phase(), Phase::Comparing);
        assert_eq!(s.current().id, "p2");
        assert_eq!(s.proposal().unwrap().id, "p3");
    }

    #[test]
    fn continue_after_liking_current_skips_the_open_proposal() {
        let mut s = session(ComparisonMode::Easy, 6);
        s.super_like(Side::Current).unwrap();

        s.continue_comparing().unwrap();

        assert_eq!(s.current().id, "p1");
        assert_eq!(s.proposal().unwrap().id, "p3");
    }

    #[test]
    fn continue_after_finalize_brings_an_unseen_proposal() {
        let mut s = session(ComparisonMode::Easy, 6);
        for _ in 0..3 {
            s.reject().unwrap();
        }
        let pending = s.proposal().unwrap().id.clone();
        assert_eq!(pending, "p5");
        s.finalize().unwrap();

        s.continue_comparing().unwrap();

        assert_eq!(s.phase(), Phase::Comparing);
        assert_eq!(s.proposal().unwrap().id, "p6");
        assert_eq!(s.remaining(), 2);
    }

    #[test]
    fn continue_is_refused_once_every_candidate_was_shown() {
        let mut s = session(ComparisonMode::Easy, 3);
        s.reject().unwrap();
        assert_eq!(s.proposal().unwrap().id, "p3");

        s.super_like(Side::Current).unwrap();

        assert!(!s.can_continue());
        assert_eq!(s.continue_comparing().unwrap_err(), ComparisonError::NotAllowed);
    }

    #[test]
    fn finalize_unlocks_after_minimum_comparisons() {
        let mut s = session(ComparisonMode::Easy, 10);

        s.reject().unwrap();
        s.accept().unwrap();
        assert!(!s.can_finalize());
        assert_eq!(s.finalize().unwrap_err(), ComparisonError::NotAllowed);

        s.reject().unwrap();
        assert!(s.can_finalize());
        s.finalize().unwrap();

        assert_eq!(s.phase(), Phase::FinalChoice);
        assert_eq!(s.final_choice().unwrap().id, "p3");
        assert_eq!(s.comparisons_made(), 3);
    }

    #[test]
    fn expert_finalize_needs_ten_comparisons() {
        let mut s = session(ComparisonMode::Expert, 20);
        for _ in 0..9 {
            s.reject().unwrap();
        }
        assert!(!s.can_finalize());
        s.reject().unwrap();
        assert!(s.can_finalize());
    }

    #[test]
    fn actions_outside_their_phase_are_refused() {
        let mut s = session(ComparisonMode::Easy, 6);
        assert_eq!(s.continue_comparing().unwrap_err(), ComparisonError::NotAllowed);

        s.super_like(Side::Current).unwrap();
        assert_eq!(s.accept().unwrap_err(), ComparisonError::NotAllowed);
        assert_eq!(s.super_like(Side::Proposal).unwrap_err(), ComparisonError::NotAllowed);
    }
}
