use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use crate::models::registrant::Registrant;

pub const NOTIFICATION_SUBJECT: &str = "[정책지원관] 새로운 가입자 알림";

// Korea Standard Time, no daylight saving.
const KST_OFFSET_SECS: i32 = 9 * 3600;

const LABEL_CELL: &str =
    "padding: 12px; border: 1px solid #E0E0E0; font-weight: bold; width: 150px;";
const VALUE_CELL: &str = "padding: 12px; border: 1px solid #E0E0E0;";

/// Links rendered under the registrant table.
#[derive(Debug, Clone, Copy)]
pub struct EmailLinks<'a> {
    pub chat_link: &'a str,
    pub dashboard_url: Option<&'a str>,
}

/// Formats a timestamp the way `ko-KR` locales print it, in KST:
/// `2025. 1. 5. 오후 3:04:05`.
pub fn format_kst(at: DateTime<Utc>) -> String {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    let local = at.with_timezone(&kst);
    let (is_pm, hour) = local.hour12();
    format!(
        "{} {} {}:{:02}:{:02}",
        local.format("%Y. %-m. %-d."),
        if is_pm { "오후" } else { "오전" },
        hour,
        local.minute(),
        local.second()
    )
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape_html(v),
        None => "-".to_string(),
    }
}

/// Renders the admin notification body for a newly stored registrant.
pub fn render_registrant_email(registrant: &Registrant, links: EmailLinks<'_>) -> String {
    let rows = [
        ("이름", or_dash(Some(registrant.name.as_str()))),
        ("소속 기관/부서", or_dash(Some(registrant.organization.as_str()))),
        ("연락처", or_dash(Some(registrant.phone.as_str()))),
        ("이메일", or_dash(Some(registrant.email.as_str()))),
        ("직급/직책", or_dash(registrant.position.as_deref())),
        ("담당 업무", or_dash(registrant.work_area.as_deref())),
        ("참여 목적", or_dash(registrant.purpose.as_deref())),
    ];

    let table = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let shade = if i % 2 == 0 {
                " style=\"background: #F8F9FA;\""
            } else {
                ""
            };
            format!(
                "<tr{shade}><td style=\"{LABEL_CELL}\">{label}</td><td style=\"{VALUE_CELL}\">{value}</td></tr>"
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let dashboard = links
        .dashboard_url
        .map(|url| {
            format!(
                r#"<a href="{}" style="display: inline-block; background: #4CAF50; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; margin: 5px;">📊 대시보드 보기</a>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: 'Apple SD Gothic Neo', 'Malgun Gothic', sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: linear-gradient(135deg, #FEE500 0%, #FFD700 100%); padding: 20px; text-align: center; border-radius: 10px 10px 0 0;">
    <h2 style="margin: 0; color: #3C1E1E;">🔔 새로운 가입자 알림</h2>
  </div>
  <div style="background: #fff; padding: 30px; border: 1px solid #E0E0E0; border-top: none;">
    <p style="font-size: 16px; color: #333; margin-bottom: 20px;">정책지원관 오픈채팅방에 새로운 가입자가 등록되었습니다.</p>
    <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
{table}
    </table>
    <p style="color: #666; font-size: 14px; margin: 20px 0;">⏰ 가입 시간: {submitted}</p>
    <div style="margin-top: 30px; text-align: center;">
      {dashboard}
      <a href="{chat}" style="display: inline-block; background: #FEE500; color: #3C1E1E; padding: 12px 24px; text-decoration: none; border-radius: 5px; margin: 5px; font-weight: bold;">💬 오픈채팅방 이동</a>
    </div>
  </div>
  <div style="background: #F8F9FA; padding: 15px; text-align: center; border-radius: 0 0 10px 10px; color: #666; font-size: 12px;">이 메일은 자동으로 발송되었습니다.</div>
</div>"#,
        table = table,
        submitted = format_kst(registrant.created_at),
        dashboard = dashboard,
        chat = escape_html(links.chat_link),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn registrant() -> Registrant {
        Registrant {
            id: Uuid::new_v4(),
            name: "Hong Gildong".into(),
            organization: "Ministry".into(),
            phone: "010-1234-5678".into(),
            email: "hong@example.com".into(),
            position: None,
            work_area: Some("<b>Policy</b>".into()),
            purpose: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 6, 4, 5).unwrap(),
        }
    }

    const LINKS: EmailLinks<'static> = EmailLinks {
        chat_link: "https://open.kakao.com/o/chat",
        dashboard_url: None,
    };

    #[test]
    fn test_format_kst_afternoon() {
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 6, 4, 5).unwrap();
        assert_eq!(format_kst(at), "2025. 1. 5. 오후 3:04:05");
    }

    #[test]
    fn test_format_kst_rolls_over_date() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 15, 30, 0).unwrap();
        assert_eq!(format_kst(at), "2025. 1. 1. 오전 12:30:00");
    }

    #[test]
    fn test_format_kst_noon_and_leap_day() {
        let noon = Utc.with_ymd_and_hms(2025, 1, 5, 3, 0, 0).unwrap();
        assert_eq!(format_kst(noon), "2025. 1. 5. 오후 12:00:00");

        let leap = Utc.with_ymd_and_hms(2024, 2, 28, 20, 15, 9).unwrap();
        assert_eq!(format_kst(leap), "2024. 2. 29. 오전 5:15:09");
    }

    #[test]
    fn test_missing_optional_fields_render_dash() {
        let html = render_registrant_email(&registrant(), LINKS);
        assert!(html.contains("직급/직책</td><td style=\"padding: 12px; border: 1px solid #E0E0E0;\">-</td>"));
        assert!(html.contains("참여 목적</td><td style=\"padding: 12px; border: 1px solid #E0E0E0;\">-</td>"));
    }

    #[test]
    fn test_user_values_are_escaped() {
        let html = render_registrant_email(&registrant(), LINKS);
        assert!(html.contains("&lt;b&gt;Policy&lt;/b&gt;"));
        assert!(!html.contains("<b>Policy</b>"));
    }

    #[test]
    fn test_links_rendered() {
        let html = render_registrant_email(
            &registrant(),
            EmailLinks {
                chat_link: "https://open.kakao.com/o/chat",
                dashboard_url: Some("https://db.example.com/editor"),
            },
        );
        assert!(html.contains("href=\"https://open.kakao.com/o/chat\""));
        assert!(html.contains("href=\"https://db.example.com/editor\""));
        assert!(html.contains("2025. 1. 5. 오후 3:04:05"));
    }
}
