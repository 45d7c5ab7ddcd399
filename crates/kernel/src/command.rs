use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use campus_common::Category;

use crate::creature::Creature;
use crate::scene::SceneNode;

type Action = dyn Fn(&mut SceneNode, f32) + Send + Sync;

/// A category mask paired with an action.
///
/// Commands are not addressed to a node. They are dispatched through the
/// whole scene graph and the action runs on every node whose category
/// shares a bit with the command's category.
#[derive(Clone)]
pub struct Command {
    pub category: Category,
    action: Arc<Action>,
}

impl Command {
    pub fn new(
        category: Category,
        action: impl Fn(&mut SceneNode, f32) + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            action: Arc::new(action),
        }
    }

    /// A command whose action only runs on creature nodes.
    pub fn for_creatures(
        category: Category,
        action: impl Fn(&mut Creature, f32) + Send + Sync + 'static,
    ) -> Self {
        Self::new(category, move |node, dt| {
            if let Some(creature) = node.creature_mut() {
                action(creature, dt);
            }
        })
    }

    /// Run the action on `node` if the categories intersect. Returns whether it ran.
    pub fn apply(&self, node: &mut SceneNode, dt: f32) -> bool {
        if self.category.matches(node.category()) {
            (self.action)(node, dt);
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// FIFO buffer between command producers (input, gameplay) and the scene graph.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Remove and return the oldest command.
    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
