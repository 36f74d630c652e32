use crate::cli::CommonArgs;
use crate::model::{LanguageShare, StatsOutput};
use anyhow::Context;
use console::style;
use std::path::PathBuf;

pub async fn exec(
    common: CommonArgs,
    output: PathBuf,
    template: Option<PathBuf>,
    stats_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let stats: StatsOutput = match stats_file {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read stats file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse stats file {}", path.display()))?
        }
        None => crate::stats::collect_stats(&common, true).await?,
    };

    let svg = match template {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            patch_template(&raw, &stats)
        }
        None => render_card(&stats),
    };

    std::fs::write(&output, svg)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} {}", style("Wrote").green().bold(), output.display());

    Ok(())
}

/// Fill the built-in four-panel card: total contributions, current streak
/// inside the flame ring, longest streak, top languages.
pub fn render_card(stats: &StatsOutput) -> String {
    CARD_TEMPLATE
        .replace("@total_contributions@", &stats.total_contributions.to_string())
        .replace("@current_streak@", &stats.current_streak.to_string())
        .replace("@longest_streak@", &stats.longest_streak.to_string())
        .replace("@top_languages@", &languages_tspans(&stats.languages))
}

/// Patch a user-supplied template in place. Placeholders are the zeroed
/// text nodes of the stock `stats_template.svg`: elements with ids
/// `total_contributions`, `current_streak`, `longest_streak`, and an empty
/// `top_languages` text block.
pub fn patch_template(template: &str, stats: &StatsOutput) -> String {
    template
        .replace(
            "id=\"total_contributions\">0",
            &format!("id=\"total_contributions\">{}", stats.total_contributions),
        )
        .replace(
            "id=\"current_streak\">0",
            &format!("id=\"current_streak\">{}", stats.current_streak),
        )
        .replace(
            "id=\"longest_streak\">0",
            &format!("id=\"longest_streak\">{}", stats.longest_streak),
        )
        .replace(
            "id=\"top_languages\" y=\"0\">",
            &format!("id=\"top_languages\" y=\"0\">{}", languages_tspans(&stats.languages)),
        )
}

fn languages_tspans(shares: &[LanguageShare]) -> String {
    shares
        .iter()
        .map(|s| {
            format!(
                "<tspan x=\"0\" dy=\"1.2em\">{}: {:.2}%</tspan>",
                s.language, s.percent
            )
        })
        .collect()
}

const CARD_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
     style="isolation: isolate" viewBox="0 0 800 250" width="800px" height="250px">
  <style>
    @keyframes fadein {
      0% { opacity: 0; }
      100% { opacity: 1; }
    }

    @keyframes currstreak {
      0% { font-size: 3px; opacity: 0.2; }
      80% { font-size: 34px; opacity: 1; }
      100% { font-size: 28px; opacity: 1; }
    }

    .title {
      font: bold 16px sans-serif;
      fill: #FFD700;
    }

    .stat {
      font: bold 28px sans-serif;
      fill: #FFFFFF;
    }

    .label {
      font: 14px sans-serif;
      fill: #AAAAAA;
    }

    .divider {
      stroke: #555555;
      stroke-width: 2;
      stroke-dasharray: 4;
    }
  </style>

  <rect width="100%" height="100%" fill="#1E1E1E" rx="15" />

  <line x1="200" y1="25" x2="200" y2="225" class="divider" />
  <line x1="400" y1="25" x2="400" y2="225" class="divider" />
  <line x1="600" y1="25" x2="600" y2="225" class="divider" />

  <g transform="translate(100, 100)">
    <text class="stat" y="0" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 0.6s">
      @total_contributions@
    </text>
    <text class="label" y="40" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 0.7s">
      Total Contributions
    </text>
  </g>

  <g style="isolation: isolate">
    <g transform="translate(300, 80)">
      <text x="0" y="32" stroke-width="0" text-anchor="middle" fill="#FFFFFF"
            stroke="none" font-family="Segoe UI, Ubuntu, sans-serif" font-weight="700"
            font-size="28px" font-style="normal" style="animation: currstreak 0.6s linear forwards">
        @current_streak@
      </text>
    </g>

    <g transform="translate(300, 120)">
      <text x="0" y="32" stroke-width="0" text-anchor="middle" fill="#AAAAAA"
            stroke="none" font-family="Segoe UI, Ubuntu, sans-serif" font-weight="700"
            font-size="14px" font-style="normal" style="opacity: 0; animation: fadein 0.5s linear forwards 0.9s">
        Current Streak
      </text>
    </g>

    <g mask="url(#ringMask)">
      <circle cx="300" cy="60" r="40" fill="none" stroke="#FFD700" stroke-width="5"
              style="opacity: 0; animation: fadein 0.5s linear forwards 0.4s"></circle>
    </g>
    <defs>
      <mask id="ringMask">
        <rect x="-50" y="-50" width="100" height="100" fill="white" />
        <circle cx="0" cy="-20" r="40" fill="black" />
        <ellipse cx="0" cy="-50" rx="20" ry="15" fill="white" />
      </mask>
    </defs>

    <g transform="translate(300, 50)" stroke-opacity="0"
       style="opacity: 0; animation: fadein 0.5s linear forwards 0.6s">
      <path d="M -12 -0.5 L 15 -0.5 L 15 23.5 L -12 23.5 L -12 -0.5 Z" fill="none"/>
      <path d="M 1.5 0.67 C 1.5 0.67 2.24 3.32 2.24 5.47 C 2.24 7.53 0.89 9.2 -1.17 9.2
               C -3.23 9.2 -4.79 7.53 -4.79 5.47 L -4.76 5.11
               C -6.78 7.51 -8 10.62 -8 13.99 C -8 18.41 -4.42 22 0 22
               C 4.42 22 8 18.41 8 13.99
               C 8 8.6 5.41 3.79 1.5 0.67 Z
               M -0.29 19 C -2.07 19 -3.51 17.6 -3.51 15.86
               C -3.51 14.24 -2.46 13.1 -0.7 12.74
               C 1.07 12.38 2.9 11.53 3.92 10.16
               C 4.31 11.45 4.51 12.81 4.51 14.2
               C 4.51 16.85 2.36 19 -0.29 19 Z"
            fill="#FF4500" stroke-opacity="0"/>
    </g>
  </g>

  <g transform="translate(500, 100)">
    <text class="stat" y="0" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 1.2s">@longest_streak@</text>
    <text class="label" y="40" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 1.3s">
      Longest Streak
    </text>
  </g>

  <g transform="translate(700, 80)">
    <text class="title" x="0" y="-20" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 1.4s">Top Languages Used</text>
    <text class="label" text-anchor="middle" style="opacity: 0; animation: fadein 0.5s linear forwards 1.5s">@top_languages@</text>
  </g>
</svg>
"##;
