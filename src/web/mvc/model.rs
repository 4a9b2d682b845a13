#![allow(non_camel_case_types)]
use super::Page;
use crate::{
  error::{ErrorKind, Result},
  query::{ReportFilter, Sort},
  schema::{CrimeReport, Role, User},
  session::{self, Access, SessionState},
  util,
  web::{Chat, Config, Reports},
};
use chrono::Utc;
use error_chain::bail;
use lazy_static::lazy_static;
use maud::Markup;
use path_tree::PathTree;
use serde_json::json;
use std::{collections::HashMap, str::FromStr};

pub struct Model {
  reports: Reports,
  chat: Chat,
  config: Config,
  pub root_url: String,
  pub user: Option<User>,
  /// Reports filed by `user`, shown as the sidebar badge.
  pub report_count: usize,
  pub get_data: HashMap<String, String>,
  pub query: HashMap<String, String>,
  conversation: Option<String>,
  pub path: String,
}

/// Search, sort and expanded row of one report table.
pub struct report_Table {
  pub view: String,
  pub rows: Vec<CrimeReport>,
  pub total: usize,
  pub filter: ReportFilter,
  pub sort: Sort,
  pub open: Option<String>,
  pub staff: bool,
}

pub struct map_State {
  pub reports: Vec<CrimeReport>,
  pub filter: ReportFilter,
  pub list_mode: bool,
  pub show_filters: bool,
  pub selected: Option<CrimeReport>,
}

pub async fn main(
  uri: String,
  query: HashMap<String, String>,
  reports: Reports,
  chat: Chat,
  config: Config,
  state: &SessionState,
  conversation: Option<String>,
) -> Result<Page> {
  lazy_static! {
    static ref PATH_TREE: PathTree::<&'static str> = {
      let mut tmp = PathTree::<&str>::new();
      for path in vec![
        "/home",
        "/login",
        "/register",
        "/dashboard",
        "/report",
        "/report/:id",
        "/map",
        "/chat",
        "/my-reports",
      ] {
        tmp.insert(path, path);
      }
      tmp
    };
  };

  let (path, data) = match PATH_TREE.find(uri.as_str()) {
    Some((path, data)) => (*path, data),
    None => return Ok(Page::Redirect(session::HOME_VIEW.to_string())),
  };
  let get_data: HashMap<_, _> = data
    .into_iter()
    .map(|(arg, value)| (arg.to_string(), value.to_string()))
    .collect();

  let access = session::guard(state);
  let user = match &access {
    Access::Granted(user) => Some((*user).clone()),
    Access::Loading | Access::Redirect(_) => None,
  };
  let report_count = user.as_ref().map_or(0, |u| reports.reported_by(&u.id).len());

  let model = Model {
    reports,
    chat,
    root_url: config.web.root_url.clone(),
    config,
    user,
    report_count,
    get_data,
    query,
    conversation,
    path: path.to_string(),
  };

  let page = match path {
    "/home" => model.m_home()?,
    "/register" => model.m_register()?,
    "/login" => match access {
      Access::Granted(_) => return Ok(Page::Redirect(session::DASHBOARD_VIEW.to_string())),
      Access::Loading | Access::Redirect(_) => model.m_login()?,
    },
    _ => match access {
      Access::Loading => model.v_loading()?,
      Access::Redirect(to) => return Ok(Page::Redirect(to.to_string())),
      Access::Granted(_) => match path {
        "/dashboard" => model.m_dashboard()?,
        "/report" => model.m_report_form()?,
        "/report/:id" => model.m_report()?,
        "/map" => model.m_map()?,
        "/chat" => model.m_chat()?,
        "/my-reports" => model.m_my_reports()?,
        _ => bail!(ErrorKind::RouteNotFound),
      },
    },
  };

  Ok(Page::Html(model.m_root(page)?))
}

impl Model {
  fn m_root(&self, page: Markup) -> Result<Markup> {
    let cors_h = util::gen_cors_hash(util::get_timestamp(), &self.config);

    let js_glob = json!({
      "path_t": self.path,
      "data": self.get_data,
      "root_url": self.root_url,
      "rpc": format!("{}rpc/", self.root_url),
      "cors_h": cors_h,
    });

    self.v_root(page, js_glob)
  }

  pub fn current_user(&self) -> Result<&User> {
    match &self.user {
      Some(user) => Ok(user),
      None => bail!(ErrorKind::Unauthorized),
    }
  }

  fn m_home(&self) -> Result<Markup> {
    self.v_home()
  }

  fn m_login(&self) -> Result<Markup> {
    // `?role=` selects an account type and fills in its demo credentials
    let requested = self.query.get("role").and_then(|r| Role::from_str(r).ok());
    self.v_login(requested.unwrap_or(Role::User), requested.is_some())
  }

  fn m_register(&self) -> Result<Markup> {
    self.v_register()
  }

  fn m_dashboard(&self) -> Result<Markup> {
    let staff = self.current_user()?.role.is_staff();

    // latest submissions, whatever their incident time
    let mut recent = self.reports.reports();
    recent.truncate(5);

    let table = self.report_table("views/dashboard", recent, staff);
    self.v_dashboard(staff, self.reports.stats(), table)
  }

  fn m_report_form(&self) -> Result<Markup> {
    let submitted = self.query.get("submitted").map_or(false, |v| v == "1");
    self.v_report_form(submitted)
  }

  fn m_report(&self) -> Result<Markup> {
    let report = match self.get_data.get("id") {
      Some(id) => self.reports.get_report_by_id(id),
      None => None,
    };
    let staff = self.current_user()?.role.is_staff();
    self.v_report(report, staff)
  }

  fn m_map(&self) -> Result<Markup> {
    let filter = ReportFilter::from_query(&self.query);
    let mut reports = filter.apply(self.reports.reports(), Utc::now());
    Sort::default().apply(&mut reports);

    let selected = self
      .query
      .get("selected")
      .and_then(|id| reports.iter().find(|r| &r.id == id).cloned());

    self.v_map(map_State {
      reports,
      filter,
      list_mode: self.query.get("view").map_or(false, |v| v == "list"),
      show_filters: self.query.get("filters").map_or(false, |v| v == "1"),
      selected,
    })
  }

  fn m_my_reports(&self) -> Result<Markup> {
    let user = self.current_user()?;
    let reports = self.reports.reported_by(&user.id);
    if reports.is_empty() {
      return self.v_my_reports(None);
    }
    let table = self.report_table("views/my-reports", reports, user.role.is_staff());
    self.v_my_reports(Some(table))
  }

  fn m_chat(&self) -> Result<Markup> {
    let (messages, pending) = match &self.conversation {
      Some(conversation) => (
        self.chat.messages(conversation),
        self.chat.has_pending_reply(conversation),
      ),
      None => (self.chat.messages(""), false),
    };
    self.v_chat(messages, pending)
  }

  /// Applies the table search (`q`) and sort state from the query string.
  fn report_table(&self, view: &str, reports: Vec<CrimeReport>, staff: bool) -> report_Table {
    let filter = ReportFilter {
      search: self.query.get("q").cloned().unwrap_or_default(),
      ..Default::default()
    };
    let sort = Sort::from_query(&self.query);
    let total = reports.len();

    let mut rows = filter.apply(reports, Utc::now());
    sort.apply(&mut rows);

    report_Table {
      view: view.to_string(),
      rows,
      total,
      filter,
      sort,
      open: self.query.get("open").cloned(),
      staff,
    }
  }
}
