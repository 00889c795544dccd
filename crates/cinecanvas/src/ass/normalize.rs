//! Event-list normalization ahead of export
//!
//! The writer runs this pipeline on a copy of the event list: sort by start,
//! drop comments, split overlapping events into non-overlapping spans whose
//! overlap carries both texts, then merge abutting spans with identical
//! text. Override tags are left in place throughout; the writer still needs
//! them to extract per-line fade times.

use super::DialogueEvent;

/// Run the full normalization pipeline on a copy of `events`
#[must_use]
pub fn prepare_for_export(events: &[DialogueEvent]) -> Vec<DialogueEvent> {
    let mut events = events.to_vec();
    // Overlap splitting assumes well-formed spans
    for event in &mut events {
        event.end = event.end.max(event.start);
    }
    sort_by_start(&mut events);
    strip_comments(&mut events);
    recombine_overlaps(&mut events);
    merge_identical(&mut events);
    events
}

/// Stable sort by start time, preserving original order for ties
pub fn sort_by_start(events: &mut [DialogueEvent]) {
    events.sort_by_key(|event| event.start);
}

/// Drop comment events
pub fn strip_comments(events: &mut Vec<DialogueEvent>) {
    events.retain(|event| !event.comment);
}

/// Split overlapping neighbors into non-overlapping spans
///
/// For each overlapping pair this produces up to three spans: the part of
/// the earlier event before the overlap, the overlap itself carrying both
/// texts joined with `\N` (earlier event on top), and the tail of whichever
/// event runs longer. Repeats until no overlaps remain. Expects the list to
/// be sorted by start.
pub fn recombine_overlaps(events: &mut Vec<DialogueEvent>) {
    let mut i = 0;
    while i + 1 < events.len() {
        if events[i].end <= events[i + 1].start {
            i += 1;
            continue;
        }
        let prev = events[i].clone();
        let cur = events[i + 1].clone();
        let overlap_end = prev.end.min(cur.end);
        let mut pieces = Vec::with_capacity(3);

        if cur.start > prev.start {
            let mut head = prev.clone();
            head.end = cur.start;
            pieces.push(head);
        }

        let mut overlap = prev.clone();
        overlap.start = cur.start;
        overlap.end = overlap_end;
        overlap.text = join_texts(&prev.text, &cur.text);
        pieces.push(overlap);

        if prev.end != cur.end {
            let longer = if prev.end > cur.end { &prev } else { &cur };
            let mut tail = longer.clone();
            tail.start = overlap_end;
            pieces.push(tail);
        }

        events.splice(i..i + 2, pieces);
        // A tail span can start after later events; restore sort order and
        // re-examine from the same index
        sort_by_start(events);
    }
}

/// Merge abutting neighbors with identical text into one span
///
/// Expects the list to be sorted by start.
pub fn merge_identical(events: &mut Vec<DialogueEvent>) {
    let mut i = 0;
    while i + 1 < events.len() {
        if events[i + 1].start == events[i].end && events[i + 1].text == events[i].text {
            let end = events[i + 1].end;
            events[i].end = end;
            events.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

fn join_texts(top: &str, bottom: &str) -> String {
    if top.is_empty() {
        bottom.to_string()
    } else if bottom.is_empty() {
        top.to_string()
    } else {
        format!("{top}\\N{bottom}")
    }
}
