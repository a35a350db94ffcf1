// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Synchronous publish/subscribe [`Bus`] buffering events until started.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
};

use derive_more::with_trait::{Display, Error};

use super::{Event, Kind, Lifecycle};

/// Subscriber of a [`Bus`].
type Handler<E> = Box<dyn FnMut(&E)>;

/// Publish/subscribe registry of [`Event`]s.
///
/// Its set of kinds is frozen at construction. Events broadcast before
/// [`Bus::start()`] are queued and delivered on start, so every handler sees
/// every event in emission order no matter when it subscribed.
pub struct Bus<E: Event> {
    registry: HashSet<E::Kind>,
    handlers: HashMap<E::Kind, Vec<Handler<E>>>,
    queue: VecDeque<E>,
    started: bool,
}

impl<E: Event> Bus<E> {
    /// Creates a new [`Bus`] accepting only the given `kinds`.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = E::Kind>) -> Self {
        Self {
            registry: kinds.into_iter().collect(),
            handlers: HashMap::new(),
            queue: VecDeque::new(),
            started: false,
        }
    }

    /// Subscribes the `handler` to events of the given `kind`.
    ///
    /// Handlers of the same kind are invoked in subscription order.
    ///
    /// # Errors
    ///
    /// If the `kind` is not registered.
    pub fn on(
        &mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) + 'static,
    ) -> Result<(), BusError> {
        self.check(kind)?;
        self.handlers.entry(kind).or_default().push(Box::new(handler));
        Ok(())
    }

    /// Publishes the `event`: dispatches it right away once started, queues
    /// it otherwise.
    ///
    /// # Errors
    ///
    /// If the kind of the `event` is not registered.
    pub fn broadcast(&mut self, event: E) -> Result<(), BusError> {
        self.check(event.kind())?;
        if self.started {
            self.dispatch(&event);
        } else {
            self.queue.push_back(event);
        }
        Ok(())
    }

    /// Flushes queued events in FIFO order and switches to immediate
    /// dispatching.
    ///
    /// Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        tracing::trace!(queued = self.queue.len(), "flushing event bus");
        while let Some(event) = self.queue.pop_front() {
            self.dispatch(&event);
        }
        self.started = true;
    }

    /// Indicates whether [`Bus::start()`] has been called.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Returns the number of queued events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Indicates whether the given `kind` is registered.
    #[must_use]
    pub fn is_registered(&self, kind: E::Kind) -> bool {
        self.registry.contains(&kind)
    }

    fn check(&self, kind: E::Kind) -> Result<(), BusError> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(BusError::unregistered(kind))
        }
    }

    fn dispatch(&mut self, event: &E) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers {
                handler(event);
            }
        }
    }
}

impl Default for Bus<Lifecycle> {
    fn default() -> Self {
        Self::new(Kind::ALL)
    }
}

impl<E: Event> fmt::Debug for Bus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("registry", &self.registry)
            .field(
                "handlers",
                &self
                    .handlers
                    .iter()
                    .map(|(kind, hs)| (kind, hs.len()))
                    .collect::<HashMap<_, _>>(),
            )
            .field("queued", &self.queue.len())
            .field("started", &self.started)
            .finish()
    }
}

/// Error of using a [`Bus`] with an unregistered event kind.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum BusError {
    /// Event kind is not registered in the [`Bus`].
    #[display("Event kind `{_0}` is not registered")]
    UnregisteredKind(#[error(not(source))] String),
}

impl BusError {
    /// Creates a new [`BusError::UnregisteredKind`].
    #[must_use]
    pub fn unregistered(kind: impl fmt::Debug) -> Self {
        Self::UnregisteredKind(format!("{kind:?}"))
    }
}
