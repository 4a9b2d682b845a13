use super::model::{self, Model as View};
use crate::{
  error::Result,
  nav,
  query::{Direction, ReportFilter, Sort, SortKey, TimeRange},
  reports::ReportStats,
  schema::{ChatMessage, CrimeReport, CrimeType, ReportStatus, Role, VerificationStatus},
  session, util,
};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value as JsonValue;
use strum::IntoEnumIterator;

const HOTSPOTS: [(&str, u32, u32); 4] = [
  ("Downtown", 32, 70),
  ("West Side", 24, 55),
  ("Central Park", 18, 40),
  ("East End", 12, 25),
];

const SUGGESTED_QUESTIONS: [&str; 5] = [
  "How do I report a theft?",
  "What information should I include in my report?",
  "How does the verification process work?",
  "Can I report anonymously?",
  "How long does it take for my report to be reviewed?",
];

impl View {
  pub fn v_root(&self, body: Markup, js_glob: JsonValue) -> Result<Markup> {
    Ok(html! {
      (DOCTYPE)
      html lang="en" {
        head {
          meta http-equiv="Content-Type" content="text/html; charset=utf-8";
          meta name="viewport" content="width=device-width";

          link rel="stylesheet" href={ (self.root_url) "static/style.css" } type="text/css" media="screen";
          script type="text/javascript" src={ (self.root_url) "static/script.js" } {  }

          title { "CrimeGuard" }

          script type="text/javascript" {
            "var __glob = " (PreEscaped(js_glob.to_string())) ";"
          }
        }
        body {
          (body)
        }
      }
    })
  }

  pub fn v_loading(&self) -> Result<Markup> {
    Ok(html! {
      .page-loading { "Loading..." }
    })
  }

  pub fn v_home(&self) -> Result<Markup> {
    Ok(html! {
      .navbar {
        .container {
          a.logo href={ (self.root_url) "views/home" } {
            (self.svg_sprite("shield", "", ""))
            span { "CrimeGuard" }
          }
          .actions {
            @if self.user.is_some() {
              a.button-primary href={ (self.root_url) (session::DASHBOARD_VIEW) } { "Dashboard" }
            } @else {
              a.button-secondary href={ (self.root_url) (session::LOGIN_VIEW) } { "Sign In" }
              a.button-primary href={ (self.root_url) "views/register" } { "Get Started" }
            }
          }
        }
      }

      .page-home {
        .hero {
          .tagline { (self.svg_sprite("shield", "", "")) "Fast, Easy, and Secured" }
          h1 { "Report Crime, Without Fear." br; "Securely and Online." }
          p {
            "Our secure platform allows you to report crimes anonymously and get real-time updates on "
            "your case. Report Crime, Create a Safer Tomorrow."
          }
          a.button-primary href={ (self.root_url) "views/report" } {
            "Report a Crime" (self.svg_sprite("chevron-right", "", ""))
          }
        }
        .figures {
          .figure { h3 { "17,500+" } p { "Crime reports filed on our platform" } }
          .figure { h3 { "2,740+" } p { "Police stations connected" } }
          .figure { h3 { "98%" } p { "Verification accuracy" } }
        }
        .features {
          h2 { "Features" }
          p { "Advanced tools and features to ensure secure and efficient crime reporting" }
          .grid {
            .feature-card {
              (self.svg_sprite("users", "", ""))
              h3 { "User Management" }
              p { "Create and manage user profiles for civilians and police officers." }
            }
            .feature-card {
              (self.svg_sprite("bar-chart", "", ""))
              h3 { "AI Analyzer" }
              p { "Advanced AI algorithms to verify and validate reported incidents." }
            }
            .feature-card {
              (self.svg_sprite("map", "", ""))
              h3 { "Interactive Maps" }
              p { "Navigate with our advanced map features and location tracking." }
            }
            .feature-card {
              (self.svg_sprite("message-square", "", ""))
              h3 { "Real-Time Chat" }
              p { "Communicate securely with law enforcement and support staff." }
            }
          }
        }
        .cta {
          h2 { "Ready to help keep your community safe?" }
          p { "Join thousands of citizens and law enforcement agencies already using CrimeGuard." }
          a.button-primary href={ (self.root_url) "views/register" } {
            "Get Started Now" (self.svg_sprite("chevron-right", "", ""))
          }
        }
      }
    })
  }

  pub fn v_login(&self, role: Role, prefill: bool) -> Result<Markup> {
    Ok(html! {
      .page-auth {
        .auth-card {
          .logo { (self.svg_sprite("shield", "", "")) "CrimeGuard" }
          h1 { "Sign in to your account" }
          form data-rpc="auth/login" {
            p.form-error {  }
            label { "Account Type" }
            .role-switch {
              @for r in Role::iter() {
                a.role-btn.active[r == role] href={ (self.root_url) (session::LOGIN_VIEW) "?role=" (r) } { (r.label()) }
              }
            }
            input type="hidden" name="role" value=(role);
            label for="email" { "Email" }
            .input-wrapper {
              .icon { (self.svg_sprite("mail", "", "")) }
              @if prefill {
                input #email type="email" name="email" placeholder="your.email@example.com" required value=(session::demo_email(role));
              } @else {
                input #email type="email" name="email" placeholder="your.email@example.com" required;
              }
            }
            label for="password" { "Password" }
            .input-wrapper {
              .icon { (self.svg_sprite("lock", "", "")) }
              input #password type="password" name="password" placeholder="Enter your password" required value=[prefill.then(|| "password")];
            }
            button.button-primary type="submit" { "Sign in" }
          }
          p.switch {
            "Don't have an account? "
            a href={ (self.root_url) "views/register" } { "Sign up" }
          }
        }
      }
    })
  }

  pub fn v_register(&self) -> Result<Markup> {
    Ok(html! {
      .page-auth {
        .auth-card {
          .logo { (self.svg_sprite("shield", "", "")) "CrimeGuard" }
          h1 { "Create your account" }
          form data-rpc="auth/register" {
            p.form-error {  }
            label for="name" { "Full Name" }
            .input-wrapper {
              .icon { (self.svg_sprite("user", "", "")) }
              input #name type="text" name="name" placeholder="John Doe" required;
            }
            label for="email" { "Email" }
            .input-wrapper {
              .icon { (self.svg_sprite("mail", "", "")) }
              input #email type="email" name="email" placeholder="your.email@example.com" required;
            }
            label for="role" { "Account Type" }
            select #role name="role" {
              @for r in Role::iter() {
                option value=(r) { (r.label()) }
              }
            }
            label for="password" { "Password" }
            .input-wrapper {
              .icon { (self.svg_sprite("lock", "", "")) }
              input #password type="password" name="password" placeholder="Create a password" required;
            }
            label for="confirm_password" { "Confirm Password" }
            .input-wrapper {
              .icon { (self.svg_sprite("lock", "", "")) }
              input #confirm_password type="password" name="confirm_password" placeholder="Repeat the password" required;
            }
            .checkbox-row {
              input #terms type="checkbox" name="terms" required;
              label for="terms" { "I agree to the Terms of Service and Privacy Policy" }
            }
            button.button-primary type="submit" { "Create account" }
          }
          p.switch {
            "Already have an account? "
            a href={ (self.root_url) (session::LOGIN_VIEW) } { "Sign in" }
          }
        }
      }
    })
  }

  pub fn v_dashboard(&self, staff: bool, stats: ReportStats, table: model::report_Table) -> Result<Markup> {
    let content = html! {
      .page-header {
        h1 { @if staff { "Admin Dashboard" } @else { "Dashboard" } }
        a.button-primary href={ (self.root_url) "views/report" } {
          (self.svg_sprite("alert-triangle", "", "")) "Report Crime"
        }
      }

      .stats {
        (self.mar_stat_card("Total Reports", stats.total, "file-text"))
        (self.mar_stat_card("Pending Reports", stats.pending, "clock"))
        (self.mar_stat_card("Resolved", stats.resolved, "check-circle"))
        (self.mar_stat_card("Verified Reports", stats.verified, "bar-chart"))
      }

      .dashboard-grid {
        .card.wide {
          .card-header {
            h2 { "Recent Reports" }
            a.button-ghost href={ (self.root_url) "views/my-reports" } {
              "View all" (self.svg_sprite("chevron-right", "", ""))
            }
          }
          (self.mar_report_table(&table)?)
        }
        .card {
          .card-header { h2 { "Crime Hotspots" } }
          .map-placeholder.small { (self.svg_sprite("map-pin", "", "")) }
          .hotspots {
            @for (area, count, share) in HOTSPOTS.iter() {
              .hotspot {
                span { (area) }
                span { (count) " reports" }
              }
              .bar { .fill style={ "width: " (share) "%" } {  } }
            }
          }
          a.button-outline href={ (self.root_url) "views/map" } { "View Full Map" }
        }
      }
    };
    self.mar_layout(content)
  }

  pub fn v_report_form(&self, submitted: bool) -> Result<Markup> {
    let content = html! {
      .page-header {
        div {
          h1 { "Report a Crime" }
          p { "Provide as much detail as possible to help us respond." }
        }
      }
      .card {
        @if submitted {
          .alert.success { "Your report has been submitted successfully. Our team will review it soon." }
        }
        form.report-form data-rpc="report/add" {
          p.form-error {  }
          label for="title" { "Report Title" }
          input #title type="text" name="title" placeholder="Brief title of the incident" required;

          label for="type" { "Crime Type" }
          select #type name="type" required {
            @for t in CrimeType::iter() {
              option value=(t) { (t.label()) }
            }
          }

          label for="description" { "Description" }
          textarea #description name="description" rows="4" placeholder="Provide detailed information about what happened" required {  }

          label for="address" { "Location" }
          .input-wrapper {
            .icon { (self.svg_sprite("map-pin", "", "")) }
            input #address type="text" name="address" placeholder="Enter the address where the incident occurred" required;
          }

          label { "Evidence Photos" }
          .input-wrapper {
            .icon { (self.svg_sprite("camera", "", "")) }
            input type="url" name="images[]" placeholder="https://... (optional)";
          }
          .checkbox-row {
            input #sample_photo type="checkbox" name="sample_photo";
            label for="sample_photo" { "Attach a sample photo" }
          }
          p.hint { "Upload photos of the incident (if available). Max 5MB per image." }

          .alert.warning {
            (self.svg_sprite("alert-triangle", "", ""))
            div {
              p.title { "Important Notice" }
              p { "Filing a false report is a serious offense. Please ensure that all information provided is accurate and truthful." }
            }
          }
          .checkbox-row {
            input #confirm type="checkbox" name="confirm" required;
            label for="confirm" { "I confirm that the information provided is true and accurate to the best of my knowledge." }
          }
          .actions {
            a.button-outline href={ (self.root_url) (session::DASHBOARD_VIEW) } { "Cancel" }
            button.button-primary type="submit" { "Submit Report" }
          }
        }
      }
    };
    self.mar_layout(content)
  }

  pub fn v_map(&self, state: model::map_State) -> Result<Markup> {
    let filter = &state.filter;
    let list = state.list_mode;
    let filters = state.show_filters;

    let content = html! {
      .page-header {
        div {
          h1 { "Crime Map" }
          p { "Interactive map showing reported crime incidents in your area." }
        }
      }

      .map-toolbar {
        form.map-search method="get" action={ (self.root_url) "views/map" } {
          .input-wrapper {
            .icon { (self.svg_sprite("search", "", "")) }
            input type="search" name="q" value=(filter.search) placeholder="Search by title, description, or location...";
          }
          @for (key, value) in filter.to_query() {
            @if key != "q" {
              input type="hidden" name=(key) value=(value);
            }
          }
          @if list { input type="hidden" name="view" value="list"; }
          @if filters { input type="hidden" name="filters" value="1"; }
        }
        a.button-outline.active[filters] href=(self.map_href(filter, list, !filters, None)?) {
          (self.svg_sprite("filter", "", "")) "Filters"
        }
        .view-toggle {
          a.active[!list] href=(self.map_href(filter, false, filters, None)?) { (self.svg_sprite("map", "", "Map view")) }
          a.active[list] href=(self.map_href(filter, true, filters, None)?) { (self.svg_sprite("list", "", "List view")) }
        }
      }

      @if filters {
        .card.filters {
          .filter-group {
            h3 { "Crime Type" }
            @for t in CrimeType::iter() {
              a.filter-option.checked[filter.types.contains(&t)] href=(self.map_href(&filter.toggle_type(t), list, true, None)?) {
                span.box {  } (t.label())
              }
            }
          }
          .filter-group {
            h3 { "Status" }
            @for s in ReportStatus::iter() {
              a.filter-option.checked[filter.statuses.contains(&s)] href=(self.map_href(&filter.toggle_status(s), list, true, None)?) {
                span.box {  } span.capitalize { (s) }
              }
            }
          }
          .filter-group {
            h3 { "Time Range" }
            @for range in TimeRange::iter() {
              @let next = ReportFilter { time_range: range, ..filter.clone() };
              a.filter-option.radio.checked[filter.time_range == range] href=(self.map_href(&next, list, true, None)?) {
                span.box {  } (range.label())
              }
            }
          }
          .actions {
            @let reset = ReportFilter { search: filter.search.clone(), ..Default::default() };
            a.button-outline href=(self.map_href(&reset, list, true, None)?) { "Reset" }
            a.button-primary href=(self.map_href(filter, list, false, None)?) { "Apply Filters" }
          }
        }
      }

      @if list {
        .report-cards {
          @for report in &state.reports {
            .report-card {
              @if let Some(image) = report.images.first() {
                .image { img src=(image) alt=(report.title); }
              }
              .body {
                h3 { a href={ (self.root_url) "views/report/" (report.id) } { (report.title) } }
                p.address { (report.location.address) }
                p.description { (report.description) }
                .badges {
                  (mar_badge("type", report.crime_type))
                  (mar_badge("status", report.status))
                }
                p.date { "Reported " (util::format_timestamp(&report.reported_at, "%-m/%-d/%Y")) }
              }
            }
          }
          @if state.reports.is_empty() {
            p.empty { "No crime reports found matching your filters" }
          }
        }
      } @else {
        .map-placeholder {
          .caption {
            (self.svg_sprite("map", "", ""))
            h3 { "Interactive Crime Map" }
            @if state.reports.is_empty() {
              p { "No crime reports found matching your filters" }
            } @else {
              p { "Map API would display crime incidents here" }
            }
          }
          @for (index, report) in state.reports.iter().enumerate() {
            @let left = 20 + (index * 50) % 60;
            @let top = 30 + (index * 30) % 40;
            a.pin.(pin_class(report)) href=(self.map_href(filter, false, filters, Some(&report.id))?)
              style={ "left: " (left) "%; top: " (top) "%" } title=(report.title) {
              span { (index + 1) }
            }
          }
          @if let Some(selected) = &state.selected {
            .selected-card {
              h4 { a href={ (self.root_url) "views/report/" (selected.id) } { (selected.title) } }
              p { (selected.location.address) }
              .badges {
                (mar_badge("type", selected.crime_type))
                (mar_badge("status", selected.status))
              }
            }
          }
        }
      }
    };
    self.mar_layout(content)
  }

  pub fn v_my_reports(&self, table: Option<model::report_Table>) -> Result<Markup> {
    let content = html! {
      .page-header {
        div {
          h1 { "My Reports" }
          p { "Track and manage all your submitted crime reports." }
        }
      }
      .card {
        @if let Some(table) = &table {
          (self.mar_report_table(table)?)
        } @else {
          .empty-state {
            .icon { (self.svg_sprite("alert-triangle", "", "")) }
            h3 { "No reports found" }
            p { "You haven't submitted any crime reports yet." }
            a.button-primary href={ (self.root_url) "views/report" } { "Report a Crime" }
          }
        }
      }
    };
    self.mar_layout(content)
  }

  pub fn v_report(&self, report: Option<CrimeReport>, staff: bool) -> Result<Markup> {
    let content = html! {
      @if let Some(report) = report {
        .page-header {
          div {
            h1 { (report.title) }
            p { "Reported " (util::format_timestamp(&report.reported_at, "%b %-d, %Y %H:%M")) }
          }
          .badges {
            (mar_badge("type", report.crime_type))
            (mar_badge("status", report.status))
            @if staff {
              (mar_badge("verification", report.verification()))
            }
          }
        }
        .card.report-detail {
          h3 { "Description" }
          p { (report.description) }
          h3 { "Location" }
          p {
            (report.location.address)
            span.coords { " (" (report.location.latitude) ", " (report.location.longitude) ")" }
          }
          @if !report.images.is_empty() {
            h3 { "Images" }
            .images {
              @for (index, image) in report.images.iter().enumerate() {
                img src=(image) alt={ "Evidence " (index + 1) };
              }
            }
          }
          @if staff {
            @if let Some(reason) = &report.verification_reason {
              h3 { "Verification Reason" }
              p { (reason) }
            }
            (self.mar_review_actions(&report))
          }
        }
      } @else {
        .empty-state {
          h3 { "Report not found" }
          a.button-outline href={ (self.root_url) "views/my-reports" } { "Back to My Reports" }
        }
      }
    };
    self.mar_layout(content)
  }

  pub fn v_chat(&self, messages: Vec<ChatMessage>, pending: bool) -> Result<Markup> {
    let content = html! {
      // poll until the scripted reply lands
      @if pending {
        meta http-equiv="refresh" content="1";
      }
      .page-header {
        div {
          h1 { "AI Assistant" }
          p { "Ask questions and get help with crime reporting and safety information." }
        }
      }
      .chat-grid {
        .card.chat {
          .chat-header {
            h2 { "CrimeGuard Assistant" }
            form data-rpc="chat/clear" {
              button.button-ghost type="submit" { (self.svg_sprite("trash", "", "")) "Clear chat" }
            }
          }
          .messages {
            @for message in &messages {
              .message.(message.sender) {
                p { (message.content) }
                span.time { (util::format_timestamp(&message.timestamp, "%H:%M")) }
              }
            }
            @if pending {
              .message.bot.typing { span {  } span {  } span {  } }
            }
          }
          form.chat-input data-rpc="chat/send" {
            input type="text" name="content" placeholder="Type your message..." autocomplete="off" required;
            button.button-primary type="submit" { (self.svg_sprite("send", "", "Send")) }
          }
        }
        .card {
          h2 { "Suggested Questions" }
          ul.suggestions {
            @for question in SUGGESTED_QUESTIONS.iter() {
              li { (question) }
            }
          }
          h2 { "About the Assistant" }
          p {
            "The assistant answers common questions about reporting crimes and using CrimeGuard. "
            "For emergencies, always call your local emergency number."
          }
        }
      }
    };
    self.mar_layout(content)
  }

  fn mar_layout(&self, content: Markup) -> Result<Markup> {
    let user = self.current_user()?;
    let role = nav::effective_role(self.user.as_ref());

    Ok(html! {
      .popup-wrapper #error {
        .popup {
          p.title { "Error!" }
          .inner {
            .message {  }
            .actions-wrapper {
              span.action-btn #close { "Ok" }
            }
          }
        }
      }

      .layout {
        aside.sidebar {
          a.logo href={ (self.root_url) (session::DASHBOARD_VIEW) } {
            (self.svg_sprite("shield", "", "")) span { "CrimeGuard" }
          }
          nav {
            @for item in nav::visible_items(role) {
              @let active = item.path.strip_prefix("views") == Some(self.path.as_str());
              a.nav-item.active[active] href={ (self.root_url) (item.path) } {
                (self.svg_sprite(item.icon, "", ""))
                span { (item.title) }
                @if item.report_badge {
                  span.badge.count { (self.report_count) }
                }
              }
            }
          }
          .user-box {
            (self.svg_sprite("user", "icon-user", ""))
            .who {
              span.name { (user.name) }
              span.role { (user.role.label()) }
            }
            form data-rpc="auth/logout" {
              button.logout type="submit" title="Sign out" { (self.svg_sprite("log-out", "", "Sign out")) }
            }
          }
        }
        main.content {
          (content)
        }
      }
    })
  }

  fn mar_stat_card(&self, title: &str, value: usize, icon: &str) -> Markup {
    html! {
      .stat-card {
        .icon { (self.svg_sprite(icon, "", "")) }
        p.title { (title) }
        p.value { (value) }
      }
    }
  }

  fn mar_report_table(&self, table: &model::report_Table) -> Result<Markup> {
    let columns = if table.staff { 7 } else { 6 };

    Ok(html! {
      .report-table {
        form.table-search method="get" action={ (self.root_url) (table.view) } {
          .input-wrapper {
            .icon { (self.svg_sprite("search", "", "")) }
            input type="search" name="q" value=(table.filter.search) placeholder="Search reports...";
          }
          @for (key, value) in table.sort.to_query() {
            input type="hidden" name=(key) value=(value);
          }
        }
        table {
          thead {
            tr {
              th { (self.mar_sort_header(table, SortKey::Title, "Title")?) }
              th { (self.mar_sort_header(table, SortKey::Type, "Type")?) }
              th { "Location" }
              th { (self.mar_sort_header(table, SortKey::ReportedAt, "Date")?) }
              th { (self.mar_sort_header(table, SortKey::Status, "Status")?) }
              @if table.staff {
                th { (self.mar_sort_header(table, SortKey::Verification, "Verification")?) }
              }
              th { "Actions" }
            }
          }
          tbody {
            @for report in &table.rows {
              @let open = table.open.as_deref() == Some(report.id.as_str());
              @let toggle = if open { None } else { Some(report.id.as_str()) };
              tr.open[open] {
                td.title { a href=(self.table_href(table, table.sort, toggle)?) { (report.title) } }
                td { (mar_badge("type", report.crime_type)) }
                td.address { (report.location.address) }
                td { (util::format_timestamp(&report.reported_at, "%b %-d, %Y")) }
                td { (mar_badge("status", report.status)) }
                @if table.staff {
                  td { (mar_badge("verification", report.verification())) }
                }
                td.actions {
                  a href={ (self.root_url) "views/report/" (report.id) } title="View details" {
                    (self.svg_sprite("clipboard", "", ""))
                  }
                }
              }
              @if open {
                tr.details {
                  td colspan=(columns) {
                    h4 { "Description" }
                    p { (report.description) }
                    @if !report.images.is_empty() {
                      h4 { "Images" }
                      .images {
                        @for (index, image) in report.images.iter().enumerate() {
                          img src=(image) alt={ "Evidence " (index + 1) };
                        }
                      }
                    }
                    @if table.staff {
                      @if let (VerificationStatus::Verified, Some(reason)) = (report.verification(), &report.verification_reason) {
                        h4 { "Verification Reason" }
                        p { (reason) }
                      }
                      (self.mar_review_actions(report))
                    } @else {
                      a.button-primary href={ (self.root_url) "views/report/" (report.id) } { "View Full Details" }
                    }
                  }
                }
              }
            }
            @if table.rows.is_empty() {
              tr {
                td.empty colspan=(columns) { "No reports found matching your search" }
              }
            }
          }
        }
        p.summary { "Showing " (table.rows.len()) " of " (table.total) " reports" }
      }
    })
  }

  fn mar_sort_header(&self, table: &model::report_Table, key: SortKey, title: &str) -> Result<Markup> {
    Ok(html! {
      a.sort href=(self.table_href(table, table.sort.select(key), table.open.as_deref())?) {
        (title)
        @if table.sort.key == key {
          @match table.sort.direction {
            Direction::Asc => { (self.svg_sprite("chevron-up", "", "")) }
            Direction::Desc => { (self.svg_sprite("chevron-down", "", "")) }
          }
        }
      }
    })
  }

  /// Status and verification controls for admin and police.
  fn mar_review_actions(&self, report: &CrimeReport) -> Markup {
    html! {
      .review-actions {
        form.inline data-rpc="report/status" {
          input type="hidden" name="id" value=(report.id);
          select name="status" {
            @for status in ReportStatus::iter() {
              option value=(status) selected[status == report.status] { (status) }
            }
          }
          button.button-outline type="submit" { "Update Status" }
        }
        form.inline data-rpc="report/verify" {
          input type="hidden" name="id" value=(report.id);
          input type="text" name="reason" placeholder="Reason (optional)";
          button.button-ok type="submit" name="status" value=(VerificationStatus::Verified) {
            (self.svg_sprite("check", "", "")) "Verify"
          }
          button.button-danger type="submit" name="status" value=(VerificationStatus::Fake) {
            (self.svg_sprite("x", "", "")) "Mark as fake"
          }
        }
      }
    }
  }

  fn table_href(&self, table: &model::report_Table, sort: Sort, open: Option<&str>) -> Result<String> {
    let mut pairs = table.filter.to_query();
    pairs.extend(sort.to_query());
    if let Some(id) = open {
      pairs.push(("open", id.to_string()));
    }
    Ok(format!("{}{}{}", self.root_url, table.view, util::query_string(&pairs)?))
  }

  fn map_href(&self, filter: &ReportFilter, list: bool, filters: bool, selected: Option<&str>) -> Result<String> {
    let mut pairs = filter.to_query();
    if list {
      pairs.push(("view", "list".to_string()));
    }
    if filters {
      pairs.push(("filters", "1".to_string()));
    }
    if let Some(id) = selected {
      pairs.push(("selected", id.to_string()));
    }
    Ok(format!("{}views/map{}", self.root_url, util::query_string(&pairs)?))
  }

  fn svg_sprite(&self, id: &str, classname: &str, title: &str) -> Markup {
    html! {
      svg.(classname) {
        @if !title.is_empty() {
          title { (title) }
        }
        use xlink:href={ (self.root_url) "static/img/sprite.svg#" (id) }{  }
      }
    }
  }
}

fn mar_badge(kind: &str, value: impl std::fmt::Display) -> Markup {
  html! {
    span.badge.(kind).(format!("{}-{}", kind, value)) { (value) }
  }
}

/// Resolved and dismissed pins are coloured by status, the rest by crime type.
fn pin_class(report: &CrimeReport) -> String {
  match report.status {
    ReportStatus::Resolved | ReportStatus::Dismissed => format!("status-{}", report.status),
    ReportStatus::Pending | ReportStatus::Investigating => format!("type-{}", report.crime_type),
  }
}
