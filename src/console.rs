use color_eyre::{eyre::eyre, eyre::Report, Result};
use superconsole::{style::Stylize, Component, Line, Lines, SuperConsole};

/// Where the blog is being served from. Stays on screen once set.
#[derive(Debug)]
pub struct Serving {
    pub address: String,
    pub posts_file: String,
    pub post_count: usize,
}

/// A one-shot line printed under the serving status.
#[derive(Debug)]
pub enum Notice {
    Info(String),
    Failure(Report),
}

#[derive(Debug, Default)]
struct ConsoleState {
    serving: Option<Serving>,
    notice: Option<Notice>,
}

#[derive(Debug)]
struct StatusView;

fn serving_lines(serving: &Serving, lines: &mut Lines) -> anyhow::Result<()> {
    lines.push(Line(vec![
        "".to_string().dark_green().try_into()?,
        format!("Serving blog @ {}", serving.address).try_into()?,
    ]));
    lines.push(Line(vec![format!(
        "Posts: {} ({} posts)",
        serving.posts_file, serving.post_count
    )
    .try_into()?]));
    Ok(())
}

fn notice_lines(notice: &Notice, lines: &mut Lines) -> anyhow::Result<()> {
    match notice {
        Notice::Info(message) => lines.push(Line(vec![message.clone().try_into()?])),
        Notice::Failure(report) => {
            lines.push(Line(vec![
                "".to_string().dark_red().try_into()?,
                "Blog stopped".try_into()?,
            ]));
            for (depth, cause) in report.chain().enumerate() {
                lines.push(Line(vec![
                    format!("    {depth}: ").try_into()?,
                    cause.to_string().dark_red().try_into()?,
                ]));
            }
        }
    }
    Ok(())
}

impl Component for StatusView {
    fn draw_unchecked(
        &self,
        state: &superconsole::State,
        _dimensions: superconsole::Dimensions,
        _mode: superconsole::DrawMode,
    ) -> anyhow::Result<Lines> {
        let mut lines = vec![];
        let Ok(state) = state.get::<ConsoleState>() else {
            return Ok(lines);
        };
        if let Some(serving) = &state.serving {
            serving_lines(serving, &mut lines)?;
        }
        if let Some(notice) = &state.notice {
            notice_lines(notice, &mut lines)?;
        }
        Ok(lines)
    }
}

/// Terminal status for `blogpress serve`.
pub struct ServeConsole {
    console: SuperConsole,
    state: ConsoleState,
}

impl ServeConsole {
    pub fn start() -> Result<ServeConsole> {
        let console = SuperConsole::new(Box::new(StatusView))
            .ok_or(eyre!("Could not initialize superconsole"))?;
        Ok(ServeConsole {
            console,
            state: ConsoleState::default(),
        })
    }

    pub fn serving(&mut self, serving: Serving) -> Result<()> {
        self.state.serving = Some(serving);
        self.redraw()
    }

    /// Draw `notice` once; it is gone from the next frame.
    pub fn notice(&mut self, notice: Notice) -> Result<()> {
        self.state.notice = Some(notice);
        let drawn = self.redraw();
        self.state.notice = None;
        drawn
    }

    fn redraw(&mut self) -> Result<()> {
        self.console
            .render(&superconsole::state!(&self.state))
            .map_err(|e| eyre!(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &Lines) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.0.iter().map(|span| span.content()).collect())
            .collect()
    }

    #[test]
    fn serving_status_lists_address_and_posts() {
        let mut lines = vec![];
        serving_lines(
            &Serving {
                address: "http://127.0.0.1:3000".to_owned(),
                posts_file: "blog_posts.json".to_owned(),
                post_count: 2,
            },
            &mut lines,
        )
        .unwrap();
        let text = text(&lines);
        assert!(text[0].ends_with("Serving blog @ http://127.0.0.1:3000"));
        assert_eq!(text[1], "Posts: blog_posts.json (2 posts)");
    }

    #[test]
    fn failure_notice_prints_cause_chain() {
        let report = eyre!("posts file unreadable").wrap_err("Could not read existing posts");
        let mut lines = vec![];
        notice_lines(&Notice::Failure(report), &mut lines).unwrap();
        let text = text(&lines);
        assert_eq!(text.len(), 3);
        assert!(text[1].contains("Could not read existing posts"));
        assert!(text[2].contains("posts file unreadable"));
    }
}
