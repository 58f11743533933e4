//! Workflow controller: transitions between drill-down levels.

use serde::{Deserialize, Serialize};

use procure_core::{
    DomainError, EntityKind, ForeignKey, PoNumber, ProductId, RecordKey, StateMachine, VendorId,
};

use crate::state::WorkflowState;

/// One selected drill-down level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "id", rename_all = "snake_case")]
pub enum ScopeLevel {
    Vendor(VendorId),
    Product(ProductId),
    Order(PoNumber),
}

impl ScopeLevel {
    pub fn kind(self) -> EntityKind {
        match self {
            ScopeLevel::Vendor(_) => EntityKind::Vendor,
            ScopeLevel::Product(_) => EntityKind::Product,
            ScopeLevel::Order(_) => EntityKind::PurchaseOrder,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            ScopeLevel::Vendor(id) => id.raw(),
            ScopeLevel::Product(id) => id.raw(),
            ScopeLevel::Order(id) => id.raw(),
        }
    }
}

/// What to do when a record that is an active scope gets deleted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Leave the deleted level and everything below it.
    #[default]
    Reconcile,
    /// Keep the state as is; child forms keep pointing at the deleted id.
    Retain,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorkflowCommand {
    SelectVendor(VendorId),
    SelectProduct(ProductId),
    SelectOrder(PoNumber),
    Back,
    /// A delete of `kind`/`id` succeeded in the store.
    RecordDeleted { kind: EntityKind, id: i64 },
}

impl WorkflowCommand {
    /// Selection command for a record of a scope-advancing kind.
    pub fn select(kind: EntityKind, raw: i64) -> Option<Self> {
        match kind.scope_key()? {
            ForeignKey::Vendor => Some(WorkflowCommand::SelectVendor(VendorId::from_raw(raw))),
            ForeignKey::Product => Some(WorkflowCommand::SelectProduct(ProductId::from_raw(raw))),
            ForeignKey::PurchaseOrder => {
                Some(WorkflowCommand::SelectOrder(PoNumber::from_raw(raw)))
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "scope", rename_all = "snake_case")]
pub enum WorkflowEvent {
    ScopeEntered(ScopeLevel),
    ScopeLeft(ScopeLevel),
}

/// Single owner of the drill-down state.
#[derive(Debug, Clone, Default)]
pub struct WorkflowController {
    state: WorkflowState,
    policy: DeletePolicy,
    version: u64,
}

impl WorkflowController {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            state: WorkflowState::NoVendor,
            policy,
            version: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    fn handle_enter(&self, level: ScopeLevel) -> Result<Vec<WorkflowEvent>, DomainError> {
        if self.state.enter(level).is_none() {
            return Err(DomainError::invariant(format!(
                "cannot select {} {} from {:?}",
                level.kind(),
                level.raw(),
                self.state
            )));
        }
        Ok(vec![WorkflowEvent::ScopeEntered(level)])
    }

    fn handle_back(&self) -> Result<Vec<WorkflowEvent>, DomainError> {
        match self.state.innermost() {
            Some(level) => Ok(vec![WorkflowEvent::ScopeLeft(level)]),
            None => Err(DomainError::invariant("already at the top of the drill-down")),
        }
    }

    fn handle_deleted(&self, kind: EntityKind, id: i64) -> Result<Vec<WorkflowEvent>, DomainError> {
        if self.policy == DeletePolicy::Retain {
            return Ok(vec![]);
        }

        if !self.state.holds(kind, id) {
            return Ok(vec![]);
        }

        // Leave innermost-first until the deleted level itself is gone.
        let mut events = Vec::new();
        let mut state = self.state;
        while let Some(level) = state.innermost() {
            events.push(WorkflowEvent::ScopeLeft(level));
            if level.kind() == kind {
                break;
            }
            state = state.leave().unwrap_or_default();
        }
        Ok(events)
    }
}

impl StateMachine for WorkflowController {
    type Command = WorkflowCommand;
    type Event = WorkflowEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &WorkflowEvent) {
        let next = match *event {
            WorkflowEvent::ScopeEntered(level) => self.state.enter(level),
            WorkflowEvent::ScopeLeft(level) if self.state.innermost() == Some(level) => {
                self.state.leave()
            }
            WorkflowEvent::ScopeLeft(_) => None,
        };
        if let Some(next) = next {
            self.state = next;
            self.version += 1;
        }
    }

    fn handle(&self, command: &WorkflowCommand) -> Result<Vec<WorkflowEvent>, DomainError> {
        match *command {
            WorkflowCommand::SelectVendor(id) => self.handle_enter(ScopeLevel::Vendor(id)),
            WorkflowCommand::SelectProduct(id) => self.handle_enter(ScopeLevel::Product(id)),
            WorkflowCommand::SelectOrder(id) => self.handle_enter(ScopeLevel::Order(id)),
            WorkflowCommand::Back => self.handle_back(),
            WorkflowCommand::RecordDeleted { kind, id } => self.handle_deleted(kind, id),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}
