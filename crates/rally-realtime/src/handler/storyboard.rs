//! Storyboard handlers. Every mutation broadcasts the full goal tree.

use rally_auth::Identity;
use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{ColumnId, GoalId};
use rally_entity::Session;
use rally_entity::storyboard::Goal;
use rally_store::StoryDraft;

use crate::event::StoryboardEvent;
use crate::message::builder;
use crate::message::types::tags;

use super::{HandlerContext, Outcome, common};

/// Handle a storyboard event.
pub async fn handle(
    ctx: &HandlerContext,
    session: &Session,
    caller: &Identity,
    event: StoryboardEvent,
) -> AppResult<Outcome> {
    let id = session.id;
    let goals = match event {
        StoryboardEvent::AddGoal(p) => ctx.store.add_goal(id, p.name.trim()).await?,
        StoryboardEvent::ReviseGoal(p) => ctx.store.revise_goal(id, p.goal_id, p.name.trim()).await?,
        StoryboardEvent::DeleteGoal(p) => ctx.store.delete_goal(id, p.goal_id).await?,
        StoryboardEvent::AddColumn(p) => ctx.store.add_column(id, p.goal_id, p.name.trim()).await?,
        StoryboardEvent::ReviseColumn(p) => {
            ctx.store
                .revise_column(id, p.column_id, p.name.trim())
                .await?
        }
        StoryboardEvent::DeleteColumn(p) => ctx.store.delete_column(id, p.column_id).await?,
        StoryboardEvent::AddStory(p) => {
            let goals = ctx.store.get_goals(id).await?;
            ensure_column_in_goal(&goals, p.goal_id, p.column_id)?;
            let draft = StoryDraft {
                name: p.name.trim().to_string(),
                content: p.content,
                color: p.color,
                points: p.points,
                closed: false,
            };
            ctx.store
                .add_story(id, p.column_id, caller.user_id, draft)
                .await?
        }
        StoryboardEvent::UpdateStory(p) => {
            let draft = StoryDraft {
                name: p.name.trim().to_string(),
                content: p.content,
                color: p.color,
                points: p.points,
                closed: p.closed,
            };
            ctx.store.update_story(id, p.story_id, draft).await?
        }
        StoryboardEvent::DeleteStory(p) => ctx.store.delete_story(id, p.story_id).await?,
        StoryboardEvent::MoveStory(p) => {
            let goals = ctx.store.get_goals(id).await?;
            ensure_column_in_goal(&goals, p.goal_id, p.column_id)?;
            ctx.store
                .move_story(id, p.story_id, p.column_id, p.position)
                .await?
        }
        StoryboardEvent::Common(event) => {
            return common::handle(ctx, session, caller, event).await;
        }
    };

    Ok(Outcome::broadcast(builder::build(
        tags::GOALS_UPDATED,
        &goals,
        Some(caller.user_id),
    )?))
}

fn ensure_column_in_goal(goals: &[Goal], goal_id: GoalId, column_id: ColumnId) -> AppResult<()> {
    let goal = goals
        .iter()
        .find(|g| g.id == goal_id)
        .ok_or_else(|| AppError::not_found(format!("Goal {goal_id} not found")))?;
    if goal.columns.iter().any(|c| c.id == column_id) {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "Column {column_id} not found in goal {goal_id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::storyboard::{AddStoryPayload, ColumnPayload, GoalPayload, MoveStoryPayload};
    use crate::handler::testing::Fixture;
    use rally_core::ErrorKind;
    use rally_entity::SessionKind;

    async fn send(fx: &Fixture, event: StoryboardEvent) -> AppResult<Vec<Goal>> {
        let outcome = handle(&fx.ctx, &fx.session, &fx.facilitator, event).await?;
        assert_eq!(outcome.broadcasts.len(), 1);
        assert_eq!(outcome.broadcasts[0].kind, tags::GOALS_UPDATED);
        Ok(outcome.broadcasts[0].payload().unwrap())
    }

    #[tokio::test]
    async fn test_story_must_land_in_a_column_of_its_goal() {
        let fx = Fixture::new(SessionKind::Storyboard).await;
        send(&fx, StoryboardEvent::AddGoal(GoalPayload { name: "Pay".into() }))
            .await
            .unwrap();
        let goals = send(&fx, StoryboardEvent::AddGoal(GoalPayload { name: "Ship".into() }))
            .await
            .unwrap();
        let (pay, ship) = (goals[0].id, goals[1].id);
        let goals = send(
            &fx,
            StoryboardEvent::AddColumn(ColumnPayload {
                goal_id: pay,
                name: "Cart".into(),
            }),
        )
        .await
        .unwrap();
        let cart = goals[0].columns[0].id;

        let story = |goal_id| {
            StoryboardEvent::AddStory(AddStoryPayload {
                goal_id,
                column_id: cart,
                name: "Add item".into(),
                content: String::new(),
                color: "blue".into(),
                points: 3,
            })
        };
        let err = send(&fx, story(ship)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let goals = send(&fx, story(pay)).await.unwrap();
        let story_id = goals[0].columns[0].stories[0].id;
        assert_eq!(goals[0].columns[0].stories[0].created_by, fx.facilitator.user_id);

        let err = send(
            &fx,
            StoryboardEvent::MoveStory(MoveStoryPayload {
                story_id,
                goal_id: ship,
                column_id: cart,
                position: 0,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
