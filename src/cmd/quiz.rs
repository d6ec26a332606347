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

//! Running a quiz in the terminal.

use std::io::Write;
use std::io::stdout;

use flipit_core::quiz::Quiz;
use flipit_core::quiz::SETTLE_DELAY;
use flipit_core::quiz::Status;
use flipit_core::quiz::Verdict;
use flipit_core::types::set::CardSet;
use flipit_core::types::set::SetId;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::io::Lines;
use tokio::io::stdin;
use tokio::time::sleep;

use crate::cmd::Context;
use crate::error::Fallible;
use crate::utils::prompt;

pub async fn run_quiz(ctx: &Context, set_id: String) -> Fallible<()> {
    ctx.require_login()?;
    let set = ctx.api.get_set(&SetId::new(set_id)).await?;
    let mut input = BufReader::new(stdin()).lines();
    let quiz = drill(&set, &mut input, &mut stdout()).await?;
    let tally = quiz.tally();
    log::info!(
        "Quiz over {} ended with {} correct and {} incorrect",
        set.set_id,
        tally.correct,
        tally.incorrect
    );
    Ok(())
}

/// Drive a quiz over `set` until it is finished or the user quits. Returns
/// the state the quiz was left in.
async fn drill<R, W>(set: &CardSet, input: &mut Lines<R>, out: &mut W) -> Fallible<Quiz>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut quiz = Quiz::new(set.cards.clone());
    writeln!(out, "{}", set.title)?;
    loop {
        match quiz.status() {
            Status::Empty => {
                writeln!(out, "This set has no cards.")?;
                return Ok(quiz);
            }
            Status::Finished => {
                if let Some(summary) = quiz.summary() {
                    writeln!(out, "Finished {} cards.", summary.cards)?;
                    writeln!(out, "Correct: {}", summary.tally.correct)?;
                    writeln!(out, "Incorrect: {}", summary.tally.incorrect)?;
                    writeln!(out, "Accuracy: {}%", summary.tally.percent())?;
                }
                if !quiz.can_redo() {
                    return Ok(quiz);
                }
                let label = format!(
                    "Press r to redo the {} missed cards, or Enter to quit: ",
                    quiz.missed().len()
                );
                match prompt(input, out, &label).await?.as_deref() {
                    Some("r") => quiz = quiz.redo_incorrect(),
                    _ => return Ok(quiz),
                }
            }
            Status::Active => {
                let Some(card) = quiz.current_card() else {
                    return Ok(quiz);
                };
                if quiz.is_revealed() {
                    writeln!(out, "A: {}", card.back)?;
                    let label = "Did you get it right? [y/n] (f to flip back, q to quit): ";
                    quiz = match prompt(input, out, label).await?.as_deref() {
                        None | Some("q") => return Ok(quiz),
                        Some("y") => quiz.answer(true),
                        Some("n") => quiz.answer(false),
                        Some("f") => quiz.flip(),
                        Some(_) => {
                            writeln!(out, "Please answer y or n.")?;
                            quiz
                        }
                    };
                    if let Some(verdict) = quiz.pending_verdict() {
                        match verdict {
                            Verdict::Correct => writeln!(out, "Correct!")?,
                            Verdict::Incorrect => writeln!(out, "Incorrect.")?,
                        }
                        sleep(SETTLE_DELAY).await;
                        quiz = quiz.advance();
                    }
                } else {
                    writeln!(
                        out,
                        "[{}/{}] Q: {}",
                        quiz.position() + 1,
                        quiz.deck_len(),
                        card.front
                    )?;
                    match prompt(input, out, "Press Enter to flip (q to quit): ")
                        .await?
                        .as_deref()
                    {
                        None | Some("q") => return Ok(quiz),
                        _ => quiz = quiz.flip(),
                    }
                }
            }
        }
    }
}
