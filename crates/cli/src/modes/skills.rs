// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mesh skills`: present for mode selection only. The skill/tool
//! plug-in registry itself is not part of this workspace.

use anyhow::Result;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SkillsArgs {}

pub async fn run(_args: SkillsArgs) -> Result<()> {
    println!("skills: no skill registry is configured in this build");
    Ok(())
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;
