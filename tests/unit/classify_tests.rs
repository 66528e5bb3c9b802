//! Unit tests for submission kind classification.

use buildboard::intake::classify_kind;
use buildboard::models::ticket::TicketKind;

#[test]
fn explicit_bug_prefix_wins() {
    assert_eq!(classify_kind("bug: the new button is great"), TicketKind::Bug);
}

#[test]
fn explicit_feature_prefix_wins() {
    assert_eq!(
        classify_kind("feature: the app crashes unless you add this"),
        TicketKind::Feature
    );
}

#[test]
fn defect_vocabulary_classifies_as_bug() {
    assert_eq!(
        classify_kind("<#app-42> login crashes on submit"),
        TicketKind::Bug
    );
    assert_eq!(classify_kind("save fails with an error"), TicketKind::Bug);
}

#[test]
fn desire_vocabulary_classifies_as_feature() {
    assert_eq!(
        classify_kind("please add a dark mode to settings"),
        TicketKind::Feature
    );
}

#[test]
fn defect_vocabulary_beats_desire_vocabulary() {
    assert_eq!(
        classify_kind("add a retry because upload fails"),
        TicketKind::Bug
    );
}

#[test]
fn defaults_to_feature() {
    assert_eq!(
        classify_kind("the settings screen could be nicer"),
        TicketKind::Feature
    );
}

#[test]
fn matches_whole_tokens_not_substrings() {
    // "address" must not trip the "add" keyword.
    assert_eq!(
        classify_kind("show the street address on the profile"),
        TicketKind::Feature
    );
    // "fixture" must not trip "fix".
    assert_eq!(
        classify_kind("use a fixture for the demo data"),
        TicketKind::Feature
    );
}
