//! Persistence collaborator contract.
//!
//! The contract is split by concern; [`Store`] bundles every part so the
//! engine can hold a single `Arc<dyn Store>`. Each call is atomic from
//! the caller's point of view.

use async_trait::async_trait;

use rally_core::result::AppResult;
use rally_core::types::{
    ActionId, AlertId, ColumnId, GoalId, GroupId, ItemId, PlanId, SessionId, StoryId, UserId,
};
use rally_entity::poker::{Plan, PokerBoard};
use rally_entity::retro::{ItemCategory, RetroAction, RetroBoard, RetroGroup, RetroItems};
use rally_entity::storyboard::Goal;
use rally_entity::{Alert, Participant, Phase, Session, SessionKind, SessionSettings, SessionState};

/// Input for [`SessionStore::create_session`].
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Room kind.
    pub kind: SessionKind,
    /// Display name.
    pub name: String,
    /// Creator; becomes the first facilitator and participant.
    pub created_by: UserId,
    /// Creator's display name.
    pub creator_name: String,
    /// Plaintext join code, hashed before storage.
    pub join_code: Option<String>,
    /// Plaintext facilitator code, hashed before storage.
    pub facilitator_code: Option<String>,
    /// Behaviour switches.
    pub settings: SessionSettings,
}

/// Fields of a poker plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    /// Title.
    pub name: String,
    /// Tracker link.
    pub link: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Fields of a storyboard story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    /// Title.
    pub name: String,
    /// Body text.
    pub content: String,
    /// Card colour.
    pub color: String,
    /// Estimate.
    pub points: u32,
    /// Finished.
    pub closed: bool,
}

/// Input for [`AlertStore::create_alert`].
#[derive(Debug, Clone)]
pub struct NewAlert {
    /// Short title.
    pub name: String,
    /// Body.
    pub content: String,
    /// Severity.
    pub level: String,
    /// Users may close it.
    pub dismissible: bool,
}

/// Session records, membership, facilitators, and phase.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Create a session with its creator as facilitator and participant.
    async fn create_session(&self, new: NewSession) -> AppResult<Session>;

    /// Fetch a session record.
    async fn get_session(&self, session_id: SessionId) -> AppResult<Session>;

    /// Full materialized state.
    async fn session_state(&self, session_id: SessionId) -> AppResult<SessionState>;

    /// Delete a session and all of its content.
    async fn delete_session(&self, session_id: SessionId) -> AppResult<()>;

    /// Add a member, or revive an abandoned one. Idempotent.
    async fn add_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
        name: &str,
        spectator: bool,
    ) -> AppResult<Vec<Participant>>;

    /// Roster.
    async fn get_participants(&self, session_id: SessionId) -> AppResult<Vec<Participant>>;

    /// Single membership record.
    async fn get_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Option<Participant>>;

    /// Flip the `active` flag.
    async fn set_participant_active(
        &self,
        session_id: SessionId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<Vec<Participant>>;

    /// Mark a member as permanently gone (and inactive).
    async fn abandon_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<Participant>>;

    /// Flip the `spectator` flag.
    async fn set_spectator(
        &self,
        session_id: SessionId,
        user_id: UserId,
        spectator: bool,
    ) -> AppResult<Vec<Participant>>;

    /// Add to the facilitator set. Idempotent.
    async fn add_facilitator(&self, session_id: SessionId, user_id: UserId)
    -> AppResult<Vec<UserId>>;

    /// Remove from the facilitator set; refuses to empty it.
    async fn remove_facilitator(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<UserId>>;

    /// `true` when the session has no join code or the code matches.
    async fn verify_join_code(&self, session_id: SessionId, code: Option<&str>) -> AppResult<bool>;

    /// `true` when the session has a facilitator code and it matches.
    async fn verify_facilitator_code(&self, session_id: SessionId, code: &str) -> AppResult<bool>;

    /// Move to `phase`, resetting transient per-phase data.
    async fn set_phase(&self, session_id: SessionId, phase: Phase) -> AppResult<Session>;
}

/// Planning-poker plans and votes.
#[async_trait]
pub trait PokerStore: Send + Sync + 'static {
    /// Plans and voting state.
    async fn get_poker_board(&self, session_id: SessionId) -> AppResult<PokerBoard>;

    /// Append a plan.
    async fn add_plan(&self, session_id: SessionId, draft: PlanDraft) -> AppResult<PokerBoard>;

    /// Edit a plan's fields.
    async fn revise_plan(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        draft: PlanDraft,
    ) -> AppResult<PokerBoard>;

    /// Delete a plan; clears voting state if it was active.
    async fn burn_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard>;

    /// Open voting on a plan, clearing its previous votes.
    async fn activate_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard>;

    /// Mark a plan skipped and close voting on it.
    async fn skip_plan(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard>;

    /// Record the agreed estimate and close voting on it.
    async fn finalize_plan(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        points: &str,
    ) -> AppResult<PokerBoard>;

    /// Insert or replace the user's vote.
    async fn set_vote(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        user_id: UserId,
        value: &str,
    ) -> AppResult<Plan>;

    /// Remove the user's vote; absent votes are not an error.
    async fn retract_vote(
        &self,
        session_id: SessionId,
        plan_id: PlanId,
        user_id: UserId,
    ) -> AppResult<Plan>;

    /// Lock voting on the active plan.
    async fn end_voting(&self, session_id: SessionId, plan_id: PlanId) -> AppResult<PokerBoard>;
}

/// Retrospective items, groups, actions, and readiness.
#[async_trait]
pub trait RetroStore: Send + Sync + 'static {
    /// Everything on the retro board.
    async fn get_retro_board(&self, session_id: SessionId) -> AppResult<RetroBoard>;

    /// Add an item in its own new group.
    async fn create_item(
        &self,
        session_id: SessionId,
        user_id: UserId,
        category: ItemCategory,
        content: &str,
    ) -> AppResult<RetroItems>;

    /// Delete an item; empty groups go with it.
    async fn delete_item(&self, session_id: SessionId, item_id: ItemId) -> AppResult<RetroItems>;

    /// Move an item into a group, or into a new group when `group_id` is `None`.
    async fn group_item(
        &self,
        session_id: SessionId,
        item_id: ItemId,
        group_id: Option<GroupId>,
    ) -> AppResult<RetroItems>;

    /// Label a group.
    async fn rename_group(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        name: &str,
    ) -> AppResult<RetroItems>;

    /// Cast one vote for a group.
    async fn group_vote(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Vec<RetroGroup>>;

    /// Withdraw one vote from a group; no-op when the user has none there.
    async fn group_downvote(
        &self,
        session_id: SessionId,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Vec<RetroGroup>>;

    /// Append an action item.
    async fn add_action(&self, session_id: SessionId, content: &str)
    -> AppResult<Vec<RetroAction>>;

    /// Edit an action item.
    async fn update_action(
        &self,
        session_id: SessionId,
        action_id: ActionId,
        content: &str,
        completed: bool,
    ) -> AppResult<Vec<RetroAction>>;

    /// Delete an action item.
    async fn delete_action(
        &self,
        session_id: SessionId,
        action_id: ActionId,
    ) -> AppResult<Vec<RetroAction>>;

    /// Mark the user ready for the next phase.
    async fn mark_ready(&self, session_id: SessionId, user_id: UserId) -> AppResult<Vec<UserId>>;

    /// Clear the user's ready marker.
    async fn mark_unready(&self, session_id: SessionId, user_id: UserId)
    -> AppResult<Vec<UserId>>;
}

/// Story-map goals, columns, and stories.
#[async_trait]
pub trait StoryboardStore: Send + Sync + 'static {
    /// All goals with nested columns and stories.
    async fn get_goals(&self, session_id: SessionId) -> AppResult<Vec<Goal>>;

    /// Append a goal.
    async fn add_goal(&self, session_id: SessionId, name: &str) -> AppResult<Vec<Goal>>;

    /// Rename a goal.
    async fn revise_goal(
        &self,
        session_id: SessionId,
        goal_id: GoalId,
        name: &str,
    ) -> AppResult<Vec<Goal>>;

    /// Delete a goal with its columns and stories.
    async fn delete_goal(&self, session_id: SessionId, goal_id: GoalId) -> AppResult<Vec<Goal>>;

    /// Append a column to a goal.
    async fn add_column(
        &self,
        session_id: SessionId,
        goal_id: GoalId,
        name: &str,
    ) -> AppResult<Vec<Goal>>;

    /// Rename a column.
    async fn revise_column(
        &self,
        session_id: SessionId,
        column_id: ColumnId,
        name: &str,
    ) -> AppResult<Vec<Goal>>;

    /// Delete a column with its stories.
    async fn delete_column(&self, session_id: SessionId, column_id: ColumnId)
    -> AppResult<Vec<Goal>>;

    /// Append a story to a column.
    async fn add_story(
        &self,
        session_id: SessionId,
        column_id: ColumnId,
        user_id: UserId,
        draft: StoryDraft,
    ) -> AppResult<Vec<Goal>>;

    /// Replace a story's fields.
    async fn update_story(
        &self,
        session_id: SessionId,
        story_id: StoryId,
        draft: StoryDraft,
    ) -> AppResult<Vec<Goal>>;

    /// Delete a story.
    async fn delete_story(&self, session_id: SessionId, story_id: StoryId) -> AppResult<Vec<Goal>>;

    /// Move a story to `position` within a column (clamped to the end).
    async fn move_story(
        &self,
        session_id: SessionId,
        story_id: StoryId,
        column_id: ColumnId,
        position: usize,
    ) -> AppResult<Vec<Goal>>;
}

/// Global alert banners.
#[async_trait]
pub trait AlertStore: Send + Sync + 'static {
    /// Alerts currently shown to users.
    async fn active_alerts(&self) -> AppResult<Vec<Alert>>;

    /// Create an active alert.
    async fn create_alert(&self, new: NewAlert) -> AppResult<Alert>;

    /// Delete an alert.
    async fn delete_alert(&self, alert_id: AlertId) -> AppResult<()>;
}

/// The whole persistence collaborator.
pub trait Store: SessionStore + PokerStore + RetroStore + StoryboardStore + AlertStore {}

impl<T> Store for T where T: SessionStore + PokerStore + RetroStore + StoryboardStore + AlertStore {}
