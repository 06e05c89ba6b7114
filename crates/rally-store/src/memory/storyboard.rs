//! [`StoryboardStore`] for [`MemoryStore`].

use async_trait::async_trait;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{ColumnId, GoalId, SessionId, StoryId, UserId};
use rally_entity::storyboard::{Column, Goal, Story, StoryboardBoard};

use super::MemoryStore;
use crate::traits::{StoryDraft, StoryboardStore};

fn goal_mut(board: &mut StoryboardBoard, goal_id: GoalId) -> AppResult<&mut Goal> {
    board
        .goals
        .iter_mut()
        .find(|g| g.id == goal_id)
        .ok_or_else(|| AppError::not_found(format!("Goal {goal_id} not found")))
}

fn column_mut(board: &mut StoryboardBoard, column_id: ColumnId) -> AppResult<&mut Column> {
    board
        .goals
        .iter_mut()
        .flat_map(|g| g.columns.iter_mut())
        .find(|c| c.id == column_id)
        .ok_or_else(|| AppError::not_found(format!("Column {column_id} not found")))
}

fn story_mut(board: &mut StoryboardBoard, story_id: StoryId) -> AppResult<&mut Story> {
    board
        .goals
        .iter_mut()
        .flat_map(|g| g.columns.iter_mut())
        .flat_map(|c| c.stories.iter_mut())
        .find(|s| s.id == story_id)
        .ok_or_else(|| AppError::not_found(format!("Story {story_id} not found")))
}

/// Detach a story from whichever column holds it.
fn take_story(board: &mut StoryboardBoard, story_id: StoryId) -> AppResult<Story> {
    for column in board.goals.iter_mut().flat_map(|g| g.columns.iter_mut()) {
        if let Some(pos) = column.stories.iter().position(|s| s.id == story_id) {
            return Ok(column.stories.remove(pos));
        }
    }
    Err(AppError::not_found(format!("Story {story_id} not found")))
}

#[async_trait]
impl StoryboardStore for MemoryStore {
    async fn get_goals(&self, session_id: SessionId) -> AppResult<Vec<Goal>> {
        self.read(session_id, |r| Ok(r.storyboard()?.goals.clone()))
    }

    async fn add_goal(&self, session_id: SessionId, name: &str) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            board.goals.push(Goal {
                id: GoalId::new(),
                name: name.to_string(),
                columns: Vec::new(),
            });
            Ok(board.goals.clone())
        })
    }

    async fn revise_goal(
        &self,
        session_id: SessionId,
        goal_id: GoalId,
        name: &str,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            goal_mut(board, goal_id)?.name = name.to_string();
            Ok(board.goals.clone())
        })
    }

    async fn delete_goal(&self, session_id: SessionId, goal_id: GoalId) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            goal_mut(board, goal_id)?;
            board.goals.retain(|g| g.id != goal_id);
            Ok(board.goals.clone())
        })
    }

    async fn add_column(
        &self,
        session_id: SessionId,
        goal_id: GoalId,
        name: &str,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            goal_mut(board, goal_id)?.columns.push(Column {
                id: ColumnId::new(),
                name: name.to_string(),
                stories: Vec::new(),
            });
            Ok(board.goals.clone())
        })
    }

    async fn revise_column(
        &self,
        session_id: SessionId,
        column_id: ColumnId,
        name: &str,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            column_mut(board, column_id)?.name = name.to_string();
            Ok(board.goals.clone())
        })
    }

    async fn delete_column(
        &self,
        session_id: SessionId,
        column_id: ColumnId,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            column_mut(board, column_id)?;
            for goal in &mut board.goals {
                goal.columns.retain(|c| c.id != column_id);
            }
            Ok(board.goals.clone())
        })
    }

    async fn add_story(
        &self,
        session_id: SessionId,
        column_id: ColumnId,
        user_id: UserId,
        draft: StoryDraft,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            column_mut(board, column_id)?.stories.push(Story {
                id: StoryId::new(),
                name: draft.name,
                content: draft.content,
                color: draft.color,
                points: draft.points,
                closed: draft.closed,
                created_by: user_id,
            });
            Ok(board.goals.clone())
        })
    }

    async fn update_story(
        &self,
        session_id: SessionId,
        story_id: StoryId,
        draft: StoryDraft,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            let story = story_mut(board, story_id)?;
            story.name = draft.name;
            story.content = draft.content;
            story.color = draft.color;
            story.points = draft.points;
            story.closed = draft.closed;
            Ok(board.goals.clone())
        })
    }

    async fn delete_story(&self, session_id: SessionId, story_id: StoryId) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            take_story(board, story_id)?;
            Ok(board.goals.clone())
        })
    }

    async fn move_story(
        &self,
        session_id: SessionId,
        story_id: StoryId,
        column_id: ColumnId,
        position: usize,
    ) -> AppResult<Vec<Goal>> {
        self.write(session_id, |r| {
            let board = r.storyboard_mut()?;
            column_mut(board, column_id)?;
            let story = take_story(board, story_id)?;
            let column = column_mut(board, column_id)?;
            let at = position.min(column.stories.len());
            column.stories.insert(at, story);
            Ok(board.goals.clone())
        })
    }
}
