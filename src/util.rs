use reqwest::Url;

/// APIキーやcontinuationトークンをマスキングしてログ出力用の文字列を生成
///
/// 最初の4文字と最後の4文字のみを表示し、中間を***でマスキング
///
/// # Examples
/// ```
/// use yt_comment_feed::util::mask_secret;
/// let masked = mask_secret("AIzaSyABC123def456GHI789");
/// assert_eq!(masked, "AIza***I789");
/// ```
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        // 短い値は全体をマスク
        return "***".to_string();
    }

    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", prefix, suffix)
}

/// 入力文字列から動画IDを取り出す
///
/// `/watch?v=<id>`・`/embed/<id>`・`youtu.be/<id>`形式のURLに対応。
/// URLとして解釈できない入力は動画IDそのものとみなし、そのまま返す。
pub fn video_id_from_input(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Ok(url) = Url::parse(input) else {
        return Some(input.to_string());
    };

    let path = url.path();
    if path == "/watch" {
        return url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty());
    }
    if let Some(id) = path.strip_prefix("/embed/") {
        return Some(id.to_string()).filter(|v| !v.is_empty());
    }
    if url.host_str() == Some("youtu.be") {
        return Some(path.trim_start_matches('/').to_string()).filter(|v| !v.is_empty());
    }

    None
}
