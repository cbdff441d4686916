/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/action.rs
*
* Pure resolution from a parsed event kind to the action the operator
* should take (§4.2). Total over the closed set of kinds: anything the
* codec couldn't recognize, or any known kind the policy doesn't mention,
* resolves to `Action::NoAction`.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::codec::ParsedKind;
use crate::crds::{Action, ActionPolicy};

pub fn resolve(kind: &ParsedKind, policy: &ActionPolicy) -> Action {
    match kind {
        ParsedKind::Known(event_kind) => policy.resolve(*event_kind),
        ParsedKind::Unrecognized => Action::NoAction,
    }
}
