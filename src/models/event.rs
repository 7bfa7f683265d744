// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static event catalog.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The event promoted on the home page and the registration page.
pub const FEATURED_EVENT_ID: &str = "gsoc-2024-10-31";

/// Display metadata for an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub image: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub link: &'static str,
}

const EVENTS: &[EventInfo] = &[EventInfo {
    id: FEATURED_EVENT_ID,
    title: "GSoC Success Story with Prathamesh Sahasrabhojane",
    image: "GsocEvent.jpeg",
    date: "October 31, 2025",
    time: "2:30 PM IST",
    link: "event-gsoc.html",
}];

/// Lookup over the compiled-in events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCatalog;

impl EventCatalog {
    pub fn get(&self, event_id: &str) -> Option<&'static EventInfo> {
        EVENTS.iter().find(|e| e.id == event_id)
    }

    pub fn all(&self) -> &'static [EventInfo] {
        EVENTS
    }

    pub fn featured(&self) -> &'static EventInfo {
        &EVENTS[0]
    }
}
