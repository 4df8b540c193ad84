// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Scrolling through result sets.
//!
//! # Overview
//!
//! - [`ScrollPosition`] — Either an offset or a keyset cursor
//! - [`KeysetScrollPosition`] — Last-seen sort key values plus a direction
//! - [`Window`] — One fetched chunk together with the positions of its items

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Direction to scroll in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScrollDirection {
    /// Towards the end of the sorted result.
    #[default]
    Forward,

    /// Towards the start of the sorted result.
    Backward
}

/// Keyset cursor: last-seen values of the sort properties.
///
/// Keys keep insertion order. An empty keyset denotes the initial position.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeysetScrollPosition {
    keys:      Vec<(String, Value)>,
    direction: ScrollDirection
}

impl KeysetScrollPosition {
    /// Cursor with the given keys and direction.
    pub fn of<I, K>(keys: I, direction: ScrollDirection) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>
    {
        let mut position = Self {
            keys: Vec::new(),
            direction
        };
        for (key, value) in keys {
            position.insert(key.into(), value);
        }
        position
    }

    /// Forward cursor.
    pub fn forward<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>
    {
        Self::of(keys, ScrollDirection::Forward)
    }

    /// Backward cursor.
    pub fn backward<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>
    {
        Self::of(keys, ScrollDirection::Backward)
    }

    /// Initial forward position without keys.
    pub fn initial() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: String, value: Value) {
        match self.keys.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.keys.push((key, value))
        }
    }

    /// Check if no keys have been captured yet.
    pub fn is_initial(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keys.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Check if `key` is part of the cursor.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[(String, Value)] {
        &self.keys
    }

    /// Scroll direction.
    pub const fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Check if scrolling forward.
    pub const fn scrolls_forward(&self) -> bool {
        matches!(self.direction, ScrollDirection::Forward)
    }

    /// Same keys, opposite direction.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            keys:      self.keys.clone(),
            direction: match self.direction {
                ScrollDirection::Forward => ScrollDirection::Backward,
                ScrollDirection::Backward => ScrollDirection::Forward
            }
        }
    }
}

/// Offset cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OffsetScrollPosition {
    offset: Option<u64>
}

impl OffsetScrollPosition {
    /// Initial position before the first element.
    pub const fn initial() -> Self {
        Self {
            offset: None
        }
    }

    /// Position of the element at `offset`.
    pub const fn of(offset: u64) -> Self {
        Self {
            offset: Some(offset)
        }
    }

    /// Check if this is the initial position.
    pub const fn is_initial(&self) -> bool {
        self.offset.is_none()
    }

    /// Offset to start reading from.
    pub const fn start(&self) -> u64 {
        match self.offset {
            Some(offset) => offset + 1,
            None => 0
        }
    }
}

/// Cursor to continue a scroll query from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScrollPosition {
    /// Offset based.
    Offset(OffsetScrollPosition),

    /// Keyset based.
    Keyset(KeysetScrollPosition)
}

impl ScrollPosition {
    /// Check if the cursor points before the first element.
    pub fn is_initial(&self) -> bool {
        match self {
            Self::Offset(o) => o.is_initial(),
            Self::Keyset(k) => k.is_initial()
        }
    }
}

/// Chunk of a scrolled result.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    content:   Vec<T>,
    positions: Vec<ScrollPosition>,
    has_next:  bool
}

impl<T> Window<T> {
    /// Build a window, deriving each element's position with `position_fn`.
    ///
    /// # Arguments
    ///
    /// * `content` — Elements of this chunk
    /// * `position_fn` — Computes the cursor for the element at an index
    /// * `has_next` — Whether more elements follow
    pub fn from<F>(content: Vec<T>, position_fn: F, has_next: bool) -> Self
    where
        F: Fn(usize, &T) -> ScrollPosition
    {
        let positions = content
            .iter()
            .enumerate()
            .map(|(i, item)| position_fn(i, item))
            .collect();
        Self {
            content,
            positions,
            has_next
        }
    }

    /// Elements.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consume into the elements.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the window has no elements.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if more elements follow.
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Check if this is the last window.
    pub const fn is_last(&self) -> bool {
        !self.has_next
    }

    /// Position of the element at `index`.
    pub fn position_at(&self, index: usize) -> Option<&ScrollPosition> {
        self.positions.get(index)
    }

    /// Position of the last element, used to request the next window.
    pub fn last_position(&self) -> Option<&ScrollPosition> {
        self.positions.last()
    }
}
