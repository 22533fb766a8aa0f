// ABOUTME: The Worker module the orchestrator deploys
// ABOUTME: Embedded ES module source plus the secret binding names it reads

/// Secret bindings the deployed script reads. Created by the
/// orchestrator at deploy time; the script refuses to run without both.
pub const SITE_URL_BINDING: &str = "WP_CRON_URL";
pub const SECRET_KEY_BINDING: &str = "WP_CRON_KEY";

/// The deployable Worker source.
///
/// One shared trigger routine behind two handlers: `scheduled` runs on
/// the cron trigger and holds the Worker alive via `waitUntil`; `fetch`
/// answers `/wp-cron.php` directly so an operator can verify the setup
/// from a browser, and passes every other path through to the origin
/// untouched.
pub fn worker_script() -> &'static str {
    WORKER_SCRIPT
}

const WORKER_SCRIPT: &str = r#"const FETCH_TIMEOUT_MS = 10000;

export default {
  async fetch(req, env) {
    const url = new URL(req.url);
    if (url.pathname === '/wp-cron.php') {
      return triggerCron(env.WP_CRON_URL, env.WP_CRON_KEY);
    }

    return fetch(req);
  },

  async scheduled(event, env, ctx) {
    ctx.waitUntil(triggerCron(env.WP_CRON_URL, env.WP_CRON_KEY));
  },
};

async function triggerCron(siteUrl, secretKey) {
  if (!siteUrl || !secretKey) {
    return new Response('Missing Worker secret bindings: WP_CRON_URL / WP_CRON_KEY.', { status: 500 });
  }

  const baseUrl = siteUrl.replace(/\/+$/, '');
  const cronUrl = `${baseUrl}/wp-cron.php?doing_wp_cron`;

  const controller = new AbortController();
  const timeoutId = setTimeout(() => controller.abort(), FETCH_TIMEOUT_MS);

  try {
    const response = await fetch(cronUrl, {
      method: 'GET',
      headers: {
        'User-Agent': 'Cloudflare-Worker-WP-Cron',
        'X-Worker-Auth': secretKey,
        'Cache-Control': 'no-cache',
      },
      signal: controller.signal,
      cf: { cacheTtl: 0 },
    });

    if (!response.ok) {
      const text = await response.text();
      return new Response(`Cron failed: HTTP ${response.status} ${response.statusText} ${text.slice(0, 500)}`, { status: 500 });
    }

    return new Response('Cloudflare Worker for WordPress works. Yay!', { status: 200 });
  } catch (err) {
    if (err && err.name === 'AbortError') {
      return new Response('Timeout waiting for wp-cron.php', { status: 504 });
    }

    return new Response('Worker runtime error while triggering cron.', { status: 500 });
  } finally {
    clearTimeout(timeoutId);
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_reads_both_bindings() {
        let script = worker_script();
        assert!(script.contains(&format!("env.{}", SITE_URL_BINDING)));
        assert!(script.contains(&format!("env.{}", SECRET_KEY_BINDING)));
    }

    #[test]
    fn script_is_an_es_module_with_both_handlers() {
        let script = worker_script();
        assert!(script.contains("export default"));
        assert!(script.contains("async fetch"));
        assert!(script.contains("async scheduled"));
        assert!(script.contains("ctx.waitUntil"));
    }

    #[test]
    fn script_guards_the_cron_path_and_timeout() {
        let script = worker_script();
        assert!(script.contains("/wp-cron.php"));
        assert!(script.contains("doing_wp_cron"));
        assert!(script.contains("FETCH_TIMEOUT_MS = 10000"));
        assert!(script.contains("X-Worker-Auth"));
    }
}
