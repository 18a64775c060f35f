// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_overlay --heading-base-level=0

//! Understory Overlay: a headless translation state machine for draggable overlays.
//!
//! An overlay container shows underlying content with a panel on top that rests at one of
//! a few *notches* and can be dragged between them, directly or by scrolling a list inside
//! it. This crate is the part of such a container that has real state: the translation
//! height, the two gesture streams competing for it, the release decision and the
//! interruptible settle animation. It renders nothing and owns no views.
//!
//! ## Pieces
//!
//! - [`OverlayContainer`](crate::container::OverlayContainer): the facade a host talks to.
//!   It keeps the children (the last one is the overlay), flushes deferred moves on
//!   layout, and reports the overlay frame.
//! - [`TranslationController`](crate::controller::TranslationController): owns the height
//!   and the target notch; drag, release, schedule and move operations.
//! - [`ContainerDelegate`](crate::delegate::ContainerDelegate): the application's side,
//!   answering notch queries and receiving notifications.
//!   [`DefaultContainerDelegate`](crate::delegate::DefaultContainerDelegate) implements
//!   every documented fallback.
//! - [`drivers`]: the direct pan driver and the scroll view hand-off driver.
//! - [`ScrollView`](crate::scroll_view::ScrollView) and
//!   [`ScrollDelegateProxy`](crate::proxy::ScrollDelegateProxy): a headless model of the
//!   scroll view and the decorator that shares its delegate slot.
//! - [`TransitionCoordinator`](crate::coordinator::TransitionCoordinator) and
//!   [`animator`]: settle animations and the progress exposed to observers.
//!
//! The pure decisions (notch sets, translation functions, target and dismissal policies)
//! live in `understory_notch`.
//!
//! ## Driving it
//!
//! Everything is single-threaded and synchronous. Time only moves when the host calls
//! [`OverlayContainer::advance`](crate::container::OverlayContainer::advance):
//!
//! ```rust
//! use kurbo::{Point, Size, Vec2};
//! use std::rc::Rc;
//! use understory_overlay::container::OverlayContainer;
//! use understory_overlay::delegate::DefaultContainerDelegate;
//! use understory_overlay::drivers::{PanGestureEvent, PanPhase};
//! use understory_overlay::types::ChildId;
//!
//! let container = OverlayContainer::new(Rc::new(DefaultContainerDelegate::with_heights(&[
//!     120.0, 400.0, 700.0,
//! ])));
//! container.set_view_controllers(vec![ChildId(0), ChildId(1)]);
//! container.layout(Size::new(390.0, 800.0));
//! assert_eq!(container.translation_height(), 120.0);
//!
//! // Drag up by 60 points, closer to notch 0 than to notch 1, and flick upward.
//! let start = Point::new(100.0, 750.0);
//! container.handle_pan(&PanGestureEvent::new(PanPhase::Began, start));
//! container.handle_pan(
//!     &PanGestureEvent::new(PanPhase::Changed, start).with_translation(Vec2::new(0.0, -60.0)),
//! );
//! container.handle_pan(
//!     &PanGestureEvent::new(PanPhase::Ended, start).with_velocity(Vec2::new(0.0, -900.0)),
//! );
//!
//! while container.advance(1.0 / 60.0) {}
//! assert_eq!(container.target_notch_index(), 1);
//! assert_eq!(container.translation_height(), 400.0);
//! ```
//!
//! ## Logging
//!
//! State transitions are logged at `debug` and per-event updates at `trace` through the
//! [`log`] facade. Install any logger to see them.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod animator;
pub mod configuration;
pub mod container;
pub mod controller;
pub mod coordinator;
pub mod delegate;
pub mod drivers;
pub mod proxy;
pub mod scroll_view;
pub mod types;

pub use container::OverlayContainer;
pub use controller::{OverlayTranslationController, TranslationController};
pub use coordinator::TransitionCoordinator;
pub use delegate::{ContainerDelegate, DefaultContainerDelegate, NotchHeight};
pub use scroll_view::{ScrollView, ScrollViewDelegate};
pub use types::{ChildId, OverlayStyle, TranslationPosition, TranslationRequest, TranslationState};
