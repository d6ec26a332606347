// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Managing sets and their cards.

use flipit_core::types::card::CardId;
use flipit_core::types::set::CardSet;
use flipit_core::types::set::SetId;
use flipit_core::types::set::SetSummary;

use crate::api::CardDraft;
use crate::api::SetDraft;
use crate::api::SetPatch;
use crate::cmd::Context;
use crate::error::Fallible;
use crate::error::fail;

pub async fn list_sets(ctx: &Context) -> Fallible<()> {
    ctx.require_login()?;
    let sets = ctx.api.list_sets().await?;
    print!("{}", render_listing(&sets));
    Ok(())
}

pub async fn show_set(ctx: &Context, set_id: String) -> Fallible<()> {
    ctx.require_login()?;
    let set = ctx.api.get_set(&SetId::new(set_id)).await?;
    print!("{}", render_set(&set));
    Ok(())
}

pub async fn create_set(ctx: &Context, title: String, description: String) -> Fallible<()> {
    ctx.require_login()?;
    if title.trim().is_empty() {
        return fail("a set needs a title.");
    }
    let set = ctx.api.create_set(&SetDraft { title, description }).await?;
    println!("Created set {} ({}).", set.title, set.set_id);
    Ok(())
}

pub async fn update_set(
    ctx: &Context,
    set_id: String,
    title: Option<String>,
    description: Option<String>,
) -> Fallible<()> {
    ctx.require_login()?;
    if title.is_none() && description.is_none() {
        return fail("nothing to update: pass --title and/or --description.");
    }
    let set_id = SetId::new(set_id);
    let patch = SetPatch { title, description };
    ctx.api.update_set(&set_id, &patch).await?;
    println!("Updated set {set_id}.");
    Ok(())
}

pub async fn delete_set(ctx: &Context, set_id: String) -> Fallible<()> {
    ctx.require_login()?;
    let set_id = SetId::new(set_id);
    ctx.api.delete_set(&set_id).await?;
    println!("Deleted set {set_id}.");
    Ok(())
}

pub async fn add_card(ctx: &Context, set_id: String, front: String, back: String) -> Fallible<()> {
    ctx.require_login()?;
    let card = ctx
        .api
        .add_card(&SetId::new(set_id), &CardDraft { front, back })
        .await?;
    println!("Added card {}.", card.card_id);
    Ok(())
}

pub async fn edit_card(
    ctx: &Context,
    set_id: String,
    card_id: String,
    front: String,
    back: String,
) -> Fallible<()> {
    ctx.require_login()?;
    let card_id = CardId::new(card_id);
    ctx.api
        .update_card(&SetId::new(set_id), &card_id, &CardDraft { front, back })
        .await?;
    println!("Updated card {card_id}.");
    Ok(())
}

pub async fn delete_card(ctx: &Context, set_id: String, card_id: String) -> Fallible<()> {
    ctx.require_login()?;
    let card_id = CardId::new(card_id);
    ctx.api.delete_card(&SetId::new(set_id), &card_id).await?;
    println!("Deleted card {card_id}.");
    Ok(())
}

fn render_listing(sets: &[SetSummary]) -> String {
    if sets.is_empty() {
        return "No sets yet. Create one with `flipit sets create <title>`.\n".to_string();
    }
    let mut out = String::new();
    for set in sets {
        let noun = if set.card_count == 1 { "card" } else { "cards" };
        out.push_str(&format!(
            "{}  {} ({} {noun})\n",
            set.set_id, set.title, set.card_count
        ));
        if !set.description.is_empty() {
            out.push_str(&format!("    {}\n", set.description));
        }
    }
    out
}

fn render_set(set: &CardSet) -> String {
    let mut out = format!("{} ({})\n", set.title, set.set_id);
    if !set.description.is_empty() {
        out.push_str(&format!("{}\n", set.description));
    }
    if set.cards.is_empty() {
        out.push_str("No cards yet.\n");
    }
    for card in &set.cards {
        out.push_str(&format!("  [{}] {} / {}\n", card.card_id, card.front, card.back));
    }
    out
}
