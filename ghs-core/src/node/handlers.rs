//! Protocol procedures for a single node.
//!
//! Each `process_*` method reacts to one message kind and returns whether
//! the message was consumed or must be retried after the node's state has
//! moved on.

use crate::{
    edge::{EdgeState, WeightBound},
    error::Result,
    message::{FragmentName, Level, Message, NodeState},
    observer::ProtocolEvent,
};

use super::{Context, Handling, Node};

impl Node {
    /// Wakes the node if it is still sleeping.
    pub(super) fn ensure_awake(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.state == NodeState::Sleeping {
            self.wakeup(cx)?;
        }
        Ok(())
    }

    /// Starts a level-zero fragment by connecting over the lightest edge.
    fn wakeup(&mut self, cx: &mut Context<'_>) -> Result<()> {
        // Links are sorted by weight, so slot 0 is the minimum-weight edge.
        if self.links.is_empty() {
            return Err(self.violation("node has no incident edges"));
        }
        let slot = 0;
        self.classify(slot, EdgeState::Branch, cx)?;
        self.level = Level::ZERO;
        self.set_state(NodeState::Found, cx);
        self.find_count = 0;
        self.in_branch = Some(slot);
        self.send(slot, Message::Connect { level: Level::ZERO }, cx)
    }

    pub(super) fn process_connect(
        &mut self,
        slot: usize,
        level: Level,
        cx: &mut Context<'_>,
    ) -> Result<Handling> {
        self.ensure_awake(cx)?;

        if level < self.level {
            // Absorb the lower-level fragment into ours.
            self.classify(slot, EdgeState::Branch, cx)?;
            let fragment = self
                .fragment
                .ok_or_else(|| self.violation("fragment above level zero has no name"))?;
            self.send(
                slot,
                Message::Initiate {
                    level: self.level,
                    fragment,
                    state: self.state,
                },
                cx,
            )?;
            if self.state == NodeState::Find {
                self.find_count += 1;
            }
            return Ok(Handling::Done);
        }

        if level > self.level {
            return Err(self.violation("CONNECT from a higher level"));
        }

        if self.link(slot)?.state == EdgeState::Basic {
            return Ok(Handling::Defer);
        }

        // Both fragments chose this edge at the same level: merge.
        let merged_level = self.level.next();
        let merged_name = FragmentName::new(self.link(slot)?.weight);
        self.send(
            slot,
            Message::Initiate {
                level: merged_level,
                fragment: merged_name,
                state: NodeState::Find,
            },
            cx,
        )?;
        self.adopt(slot, merged_level, merged_name, NodeState::Find, cx)?;
        Ok(Handling::Done)
    }

    pub(super) fn process_initiate(
        &mut self,
        slot: usize,
        level: Level,
        fragment: FragmentName,
        state: NodeState,
        cx: &mut Context<'_>,
    ) -> Result<Handling> {
        if self.state == NodeState::Sleeping {
            return Err(self.violation("INITIATE reached a sleeping node"));
        }
        // The merging peer's INITIATE repeats what this node already adopted
        // when it handled the peer's CONNECT.
        if self.level == level && self.fragment == Some(fragment) {
            return Ok(Handling::Done);
        }
        self.adopt(slot, level, fragment, state, cx)?;
        Ok(Handling::Done)
    }

    /// Adopts a fragment identity and relays it to every child.
    fn adopt(
        &mut self,
        slot: usize,
        level: Level,
        fragment: FragmentName,
        state: NodeState,
        cx: &mut Context<'_>,
    ) -> Result<()> {
        if level < self.level {
            return Err(self.violation("fragment level would decrease"));
        }
        if level != self.level || self.fragment != Some(fragment) {
            cx.observer.observe(&ProtocolEvent::LevelRaised {
                node: self.id,
                from: self.level,
                to: level,
                fragment,
            });
        }
        self.level = level;
        self.fragment = Some(fragment);
        self.set_state(state, cx);
        self.in_branch = Some(slot);
        self.best_link = None;
        self.best_weight = WeightBound::Infinite;

        let children: Vec<usize> = self
            .links
            .iter()
            .enumerate()
            .filter(|&(child, link)| child != slot && link.state == EdgeState::Branch)
            .map(|(child, _)| child)
            .collect();
        for &child in &children {
            self.send(
                child,
                Message::Initiate {
                    level,
                    fragment,
                    state,
                },
                cx,
            )?;
        }

        if state == NodeState::Find {
            self.find_count = children.len();
            self.test(cx)?;
        }
        Ok(())
    }

    /// Probes the lightest unclassified edge, or reports when none is left.
    fn test(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let candidate = self
            .links
            .iter()
            .position(|link| link.state == EdgeState::Basic);
        let Some(slot) = candidate else {
            self.test_link = None;
            return self.report(cx);
        };
        let fragment = self
            .fragment
            .ok_or_else(|| self.violation("TEST issued before the fragment was named"))?;
        self.test_link = Some(slot);
        self.send(
            slot,
            Message::Test {
                level: self.level,
                fragment,
            },
            cx,
        )
    }

    pub(super) fn process_test(
        &mut self,
        slot: usize,
        level: Level,
        fragment: FragmentName,
        cx: &mut Context<'_>,
    ) -> Result<Handling> {
        self.ensure_awake(cx)?;

        if level > self.level {
            return Ok(Handling::Defer);
        }
        if self.fragment != Some(fragment) {
            self.send(slot, Message::Accept, cx)?;
            return Ok(Handling::Done);
        }

        if self.link(slot)?.state == EdgeState::Basic {
            self.classify(slot, EdgeState::Rejected, cx)?;
        }
        if self.test_link == Some(slot) {
            self.test(cx)?;
        } else {
            self.send(slot, Message::Reject, cx)?;
        }
        Ok(Handling::Done)
    }

    pub(super) fn process_accept(&mut self, slot: usize, cx: &mut Context<'_>) -> Result<Handling> {
        if self.test_link != Some(slot) {
            return Err(self.violation("ACCEPT on an edge that is not under test"));
        }
        self.test_link = None;
        let weight = WeightBound::Finite(self.link(slot)?.weight);
        if weight < self.best_weight {
            self.best_link = Some(slot);
            self.best_weight = weight;
        }
        self.report(cx)?;
        Ok(Handling::Done)
    }

    pub(super) fn process_reject(&mut self, slot: usize, cx: &mut Context<'_>) -> Result<Handling> {
        if self.test_link != Some(slot) {
            return Err(self.violation("REJECT on an edge that is not under test"));
        }
        if self.link(slot)?.state == EdgeState::Basic {
            self.classify(slot, EdgeState::Rejected, cx)?;
        }
        self.test(cx)?;
        Ok(Handling::Done)
    }

    /// Sends the subtree's best weight toward the root once every child has
    /// reported and no local test is outstanding.
    fn report(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.find_count != 0 || self.test_link.is_some() {
            return Ok(());
        }
        let parent = self
            .in_branch
            .ok_or_else(|| self.violation("REPORT without a parent edge"))?;
        self.set_state(NodeState::Found, cx);
        self.send(
            parent,
            Message::Report {
                weight: self.best_weight,
            },
            cx,
        )
    }

    pub(super) fn process_report(
        &mut self,
        slot: usize,
        weight: WeightBound,
        cx: &mut Context<'_>,
    ) -> Result<Handling> {
        if self.in_branch != Some(slot) {
            self.find_count = self.find_count.saturating_sub(1);
            if weight < self.best_weight {
                self.best_weight = weight;
                self.best_link = Some(slot);
            }
            self.report(cx)?;
            return Ok(Handling::Done);
        }

        // Report from the other half of the core.
        if self.state == NodeState::Find {
            return Ok(Handling::Defer);
        }
        if weight.is_infinite() && self.best_weight.is_infinite() {
            self.halt(cx);
        } else if weight >= self.best_weight {
            self.change_root(cx)?;
        }
        Ok(Handling::Done)
    }

    pub(super) fn process_change_root(&mut self, cx: &mut Context<'_>) -> Result<Handling> {
        self.change_root(cx)?;
        Ok(Handling::Done)
    }

    /// Routes the fragment's connect toward the best outgoing edge.
    fn change_root(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let slot = self
            .best_link
            .ok_or_else(|| self.violation("CHANGE_ROOT without a best edge"))?;
        if self.link(slot)?.state == EdgeState::Branch {
            return self.send(slot, Message::ChangeRoot, cx);
        }
        self.classify(slot, EdgeState::Branch, cx)?;
        self.send(slot, Message::Connect { level: self.level }, cx)
    }

    fn halt(&mut self, cx: &mut Context<'_>) {
        if self.halted {
            return;
        }
        self.halted = true;
        cx.observer.observe(&ProtocolEvent::Halted {
            node: self.id,
            fragment: self.fragment,
            weight: WeightBound::Infinite,
        });
    }
}
