use crate::{
    cli::globals::GlobalArgs,
    routes::{catalog, Navigation},
};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

#[derive(Debug)]
pub struct NavigateArgs {
    pub globals: GlobalArgs,
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
enum NavigationReport<'a> {
    Render {
        route: Option<&'a str>,
        pattern: String,
        params: Vec<(&'a str, &'a str)>,
    },
    Redirect {
        to: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<&'a str>,
    },
    NotFound,
}

impl<'a> From<&'a Navigation<'a>> for NavigationReport<'a> {
    fn from(navigation: &'a Navigation<'a>) -> Self {
        match navigation {
            Navigation::Render(matched) => {
                let pattern = matched
                    .chain()
                    .iter()
                    .map(|node| node.pattern().as_str().trim_matches('/'))
                    .filter(|segment| !segment.is_empty())
                    .collect::<Vec<_>>()
                    .join("/");
                Self::Render {
                    route: matched.leaf().name(),
                    pattern: format!("/{pattern}"),
                    params: matched
                        .params()
                        .iter()
                        .map(|(key, value)| (key.as_str(), value.as_str()))
                        .collect(),
                }
            }
            Navigation::Redirect(redirect) => Self::Redirect {
                to: &redirect.to,
                from: redirect.from.as_deref(),
            },
            Navigation::NotFound => Self::NotFound,
        }
    }
}

impl NavigationReport<'_> {
    fn text(&self) -> String {
        match self {
            Self::Render {
                route,
                pattern,
                params,
            } => {
                let mut text = format!("render {} ({pattern})", route.unwrap_or("unnamed"));
                for (key, value) in params {
                    text.push_str(&format!(" {key}={value}"));
                }
                text
            }
            Self::Redirect { to, from: Some(from) } => format!("redirect {to} (from {from})"),
            Self::Redirect { to, from: None } => format!("redirect {to}"),
            Self::NotFound => "not found".to_string(),
        }
    }
}

/// Evaluates the route guard for a location with the persisted session.
///
/// # Errors
/// Returns an error if the route table cannot be built or the report cannot
/// be encoded.
pub fn navigate(args: &NavigateArgs) -> Result<()> {
    let table = catalog::crowdfunding().context("failed to build route table")?;
    let store = args.globals.session_store();
    let session = store.current();
    let paths = args.globals.config.guard_paths();

    let navigation = table.navigate(&args.location, session.as_ref(), &paths);
    let report = NavigationReport::from(&navigation);

    if args.globals.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.text());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RouteReport {
    path: String,
    name: Option<String>,
    access: Vec<String>,
}

/// Lists every renderable route with the policies on its chain.
///
/// # Errors
/// Returns an error if the route table cannot be built or the listing cannot
/// be encoded.
pub fn routes(args: &Args) -> Result<()> {
    let table = catalog::crowdfunding().context("failed to build route table")?;
    let reports: Vec<RouteReport> = table
        .entries()
        .into_iter()
        .map(|entry| RouteReport {
            path: entry.path,
            name: entry.name,
            access: entry.policies.iter().map(ToString::to_string).collect(),
        })
        .collect();

    if args.globals.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let width = reports.iter().map(|report| report.path.len()).max().unwrap_or(0);
    for report in &reports {
        let access = if report.access.is_empty() {
            "public".to_string()
        } else {
            report.access.join(" / ")
        };
        println!(
            "{:<width$}  {:<22}  {access}",
            report.path,
            report.name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardPaths;
    use crate::session::{Role, Session};

    #[test]
    fn report_describes_render_with_params() {
        let table = catalog::crowdfunding().expect("table");
        let navigation = table.navigate("/projects/8/faqs", None, &GuardPaths::default());
        let report = NavigationReport::from(&navigation);
        assert_eq!(report.text(), r"render project-faqs (/projects/:id(\d+)/faqs) id=8");
    }

    #[test]
    fn report_describes_redirects() {
        let table = catalog::crowdfunding().expect("table");
        let staff = Session::new("t", "1", Role::Staff, None).expect("session");
        let navigation = table.navigate("/", Some(&staff), &GuardPaths::default());
        let report = NavigationReport::from(&navigation);
        assert_eq!(report.text(), "redirect /invisible-projects");
        assert_eq!(
            serde_json::to_value(&report).expect("json"),
            serde_json::json!({"decision": "redirect", "to": "/invisible-projects"})
        );

        let navigation = table.navigate("/nope", None, &GuardPaths::default());
        assert_eq!(NavigationReport::from(&navigation).text(), "not found");
    }
}
