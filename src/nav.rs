use crate::schema::{Role, User};

pub struct NavItem {
  pub title: &'static str,
  pub icon: &'static str,
  pub path: &'static str,
  /// `None` shows the item to every role.
  pub roles: Option<&'static [Role]>,
  /// Badge with the current user's report count.
  pub report_badge: bool,
}

const fn item(title: &'static str, icon: &'static str, path: &'static str) -> NavItem {
  NavItem {
    title,
    icon,
    path,
    roles: None,
    report_badge: false,
  }
}

pub const SIDEBAR: [NavItem; 9] = [
  item("Dashboard", "home", "views/dashboard"),
  item("Report Crime", "alert-triangle", "views/report"),
  NavItem {
    report_badge: true,
    ..item("My Reports", "file-text", "views/my-reports")
  },
  item("Crime Map", "map", "views/map"),
  NavItem {
    roles: Some(&[Role::Admin, Role::Police]),
    ..item("Analytics", "bar-chart", "views/analytics")
  },
  item("Chat Assistant", "message-square", "views/chat"),
  NavItem {
    roles: Some(&[Role::Admin]),
    ..item("User Management", "user", "views/users")
  },
  item("Settings", "settings", "views/settings"),
  item("Help & Support", "help-circle", "views/help"),
];

/// Role used for menu filtering; visitors without a session count as `user`.
pub fn effective_role(user: Option<&User>) -> Role {
  user.map_or(Role::User, |u| u.role)
}

pub fn visible_items(role: Role) -> impl Iterator<Item = &'static NavItem> {
  SIDEBAR
    .iter()
    .filter(move |item| item.roles.map_or(true, |roles| roles.contains(&role)))
}
