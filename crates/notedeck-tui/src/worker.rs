use std::sync::mpsc::{self, Receiver};
use std::thread::Scope;

use notedeck_core::collab::{MutationError, TreeMutations};
use notedeck_core::edit::{CreateCommit, RenameCommit};
use notedeck_core::node::Node;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommitJob {
    Rename(RenameCommit),
    Create(CreateCommit),
}

impl CommitJob {
    pub(crate) fn token(&self) -> u64 {
        match self {
            Self::Rename(commit) => commit.token,
            Self::Create(commit) => commit.token,
        }
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            Self::Rename(commit) => &commit.label,
            Self::Create(commit) => &commit.label,
        }
    }

    fn run(self, mutations: &dyn TreeMutations) -> CommitEvent {
        match self {
            Self::Rename(commit) => {
                let result = mutations.rename(&commit.node_id, commit.node_type, &commit.label);
                CommitEvent::Renamed { commit, result }
            }
            Self::Create(commit) => {
                let result =
                    mutations.create(commit.parent_id.as_deref(), commit.child_type, &commit.label);
                CommitEvent::Created { commit, result }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum CommitEvent {
    Renamed {
        commit: RenameCommit,
        result: Result<(), MutationError>,
    },
    Created {
        commit: CreateCommit,
        result: Result<Node, MutationError>,
    },
}

/// Runs collaborator calls off the render loop. Each dispatch answers on its own channel.
pub(crate) trait CommitDispatcher {
    fn dispatch(&self, job: CommitJob) -> Receiver<CommitEvent>;
}

pub(crate) struct ScopedWorker<'scope, 'env> {
    scope: &'scope Scope<'scope, 'env>,
    mutations: &'env dyn TreeMutations,
}

impl<'scope, 'env> ScopedWorker<'scope, 'env> {
    pub(crate) fn new(
        scope: &'scope Scope<'scope, 'env>,
        mutations: &'env dyn TreeMutations,
    ) -> Self {
        Self { scope, mutations }
    }
}

impl CommitDispatcher for ScopedWorker<'_, '_> {
    fn dispatch(&self, job: CommitJob) -> Receiver<CommitEvent> {
        let (sender, receiver) = mpsc::channel();
        let mutations = self.mutations;
        let token = job.token();
        self.scope.spawn(move || {
            debug!(token, "commit worker started");
            let _ = sender.send(job.run(mutations));
            debug!(token, "commit worker finished");
        });
        receiver
    }
}

/// Runs the call on the caller's thread. The result is already queued when `dispatch` returns.
#[cfg(test)]
#[derive(Clone, Copy)]
pub(crate) struct InlineDispatcher<'a> {
    mutations: &'a dyn TreeMutations,
}

#[cfg(test)]
impl<'a> InlineDispatcher<'a> {
    pub(crate) fn new(mutations: &'a dyn TreeMutations) -> Self {
        Self { mutations }
    }
}

#[cfg(test)]
impl CommitDispatcher for InlineDispatcher<'_> {
    fn dispatch(&self, job: CommitJob) -> Receiver<CommitEvent> {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(job.run(self.mutations));
        receiver
    }
}

/// Holds every job until `release`, standing in for a worker that is still running.
#[cfg(test)]
pub(crate) struct DeferredDispatcher<'a> {
    mutations: &'a dyn TreeMutations,
    queued: std::cell::RefCell<Vec<(CommitJob, mpsc::Sender<CommitEvent>)>>,
}

#[cfg(test)]
impl<'a> DeferredDispatcher<'a> {
    pub(crate) fn new(mutations: &'a dyn TreeMutations) -> Self {
        Self {
            mutations,
            queued: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn release(&self) {
        for (job, sender) in self.queued.borrow_mut().drain(..) {
            let _ = sender.send(job.run(self.mutations));
        }
    }
}

#[cfg(test)]
impl CommitDispatcher for DeferredDispatcher<'_> {
    fn dispatch(&self, job: CommitJob) -> Receiver<CommitEvent> {
        let (sender, receiver) = mpsc::channel();
        self.queued.borrow_mut().push((job, sender));
        receiver
    }
}
