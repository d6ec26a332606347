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

use flipit_core::session::Theme;

use crate::cmd::Context;
use crate::error::Fallible;

/// Set the theme, or flip it when none is given.
pub fn set_theme(ctx: &Context, theme: Option<Theme>) -> Fallible<()> {
    let theme = match theme {
        Some(theme) => {
            ctx.session.set_theme(theme)?;
            theme
        }
        None => ctx.session.toggle_theme()?,
    };
    println!("Theme: {theme}");
    Ok(())
}
