//! Line-driven walk through the PlantCare pages.

use std::path::PathBuf;

use anyhow::Result;
use plantcare_core::{otp::OtpCode, phone::Phone, wire::AnalyzeResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use plantcare_cli::{
  client::ApiClient,
  session::{Page, Session},
};

/// What the user typed at the OTP prompt.
enum CodeEntry {
  Code(String),
  Resend,
  Back,
}

/// Application state for the interactive flow.
pub struct App<R> {
  client:  ApiClient,
  session: Session,
  page:    Page,
  input:   Lines<R>,
}

impl<R: AsyncBufRead + Unpin> App<R> {
  pub fn new(client: ApiClient, input: R) -> Self {
    Self {
      client,
      session: Session::new(),
      page: Page::Landing,
      input: input.lines(),
    }
  }

  /// Run until the user quits or input ends.
  pub async fn run(&mut self) -> Result<()> {
    loop {
      let page = self.session.resolve(self.page);
      let next = match page {
        Page::Landing => self.landing().await?,
        Page::SignUp => self.sign_up().await?,
        Page::SignIn => self.sign_in().await?,
        Page::Home => self.home().await?,
        Page::Scanner => self.scanner().await?,
        Page::Result => self.result().await?,
      };
      match next {
        Some(p) => self.page = p,
        None => return Ok(()),
      }
    }
  }

  /// Print `label` and read one trimmed line. `None` on end of input.
  async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
    println!("{label}");
    Ok(self.input.next_line().await?.map(|l| l.trim().to_owned()))
  }

  async fn choose(&mut self, options: &[(&str, Page)]) -> Result<Option<Page>> {
    for (i, (label, _)) in options.iter().enumerate() {
      println!("  {}) {label}", i + 1);
    }
    loop {
      let Some(answer) = self.prompt("> ").await? else { return Ok(None) };
      if answer == "q" {
        return Ok(None);
      }
      let picked = answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i));
      match picked {
        Some((_, page)) => return Ok(Some(*page)),
        None => println!("Pick 1-{} or q to quit", options.len()),
      }
    }
  }

  async fn ask_phone(&mut self) -> Result<Option<String>> {
    loop {
      let Some(raw) = self.prompt("Phone number (10 digits):").await? else {
        return Ok(None);
      };
      if Phone::parse(&raw).is_ok() {
        return Ok(Some(raw));
      }
      println!("Please enter a valid 10-digit phone number");
    }
  }

  async fn ask_code(&mut self) -> Result<Option<CodeEntry>> {
    loop {
      let Some(raw) = self
        .prompt("Enter the 6-digit OTP (r to resend, b to go back):")
        .await?
      else {
        return Ok(None);
      };
      match raw.as_str() {
        "r" => return Ok(Some(CodeEntry::Resend)),
        "b" => return Ok(Some(CodeEntry::Back)),
        _ if OtpCode::parse(&raw).is_ok() => return Ok(Some(CodeEntry::Code(raw))),
        _ => println!("Please enter a valid 6-digit OTP"),
      }
    }
  }

  /// Stay on the code step until the server accepts a code. A rejected code
  /// can be retried; `r` asks the server for a fresh one.
  async fn verify(&mut self, phone: &str, name: Option<&str>) -> Result<Option<Page>> {
    loop {
      let code = match self.ask_code().await? {
        None => return Ok(None),
        Some(CodeEntry::Back) => return Ok(Some(Page::Landing)),
        Some(CodeEntry::Resend) => {
          match self.client.send_otp(phone).await {
            Ok(ack) => println!("{}", ack.message),
            Err(e) => println!("Failed to send OTP: {e:#}"),
          }
          continue;
        }
        Some(CodeEntry::Code(code)) => code,
      };

      let outcome = match name {
        Some(name) => self.client.signup(name, phone, &code).await,
        None => self.client.signin(phone, &code).await,
      };
      match outcome {
        Ok(auth) => {
          println!("{}", auth.message);
          self.session.login(auth.user);
          return Ok(Some(Page::Home));
        }
        Err(e) => println!("Verification failed: {e:#}"),
      }
    }
  }

  // ── Pages ─────────────────────────────────────────────────────────────────

  async fn landing(&mut self) -> Result<Option<Page>> {
    println!("\nPlantCare AI — diagnose plant diseases from a photo");
    self
      .choose(&[("Sign up", Page::SignUp), ("Sign in", Page::SignIn)])
      .await
  }

  async fn sign_up(&mut self) -> Result<Option<Page>> {
    println!("\nCreate an account");
    let name = loop {
      let Some(name) = self.prompt("Your name:").await? else { return Ok(None) };
      if !name.is_empty() {
        break name;
      }
      println!("Please enter your name");
    };
    let Some(phone) = self.ask_phone().await? else { return Ok(None) };
    if let Err(e) = self.client.send_otp(&phone).await {
      println!("Failed to send OTP: {e:#}");
      return Ok(Some(Page::Landing));
    }
    self.verify(&phone, Some(&name)).await
  }

  async fn sign_in(&mut self) -> Result<Option<Page>> {
    println!("\nSign in");
    let Some(phone) = self.ask_phone().await? else { return Ok(None) };
    if let Err(e) = self.client.send_otp(&phone).await {
      println!("Failed to send OTP: {e:#}");
      return Ok(Some(Page::Landing));
    }
    self.verify(&phone, None).await
  }

  async fn home(&mut self) -> Result<Option<Page>> {
    if let Some(user) = self.session.user() {
      println!("\nWelcome, {}", user.name);
    }
    let mut options = vec![("Scan a plant", Page::Scanner)];
    if self.session.last_scan().is_some() {
      options.push(("Show last result", Page::Result));
    }
    options.push(("Log out", Page::Landing));

    let next = self.choose(&options).await?;
    if next == Some(Page::Landing) {
      self.session.logout();
    }
    Ok(next)
  }

  async fn scanner(&mut self) -> Result<Option<Page>> {
    let Some(raw) = self.prompt("\nPath to a plant photo (blank to go back):").await?
    else {
      return Ok(None);
    };
    if raw.is_empty() {
      return Ok(Some(Page::Home));
    }

    println!("Analysing…");
    match self.client.analyze_image(&PathBuf::from(raw)).await {
      Ok(result) => {
        self.session.record_scan(result);
        Ok(Some(Page::Result))
      }
      Err(e) => {
        println!("Analysis failed: {e:#}");
        Ok(Some(Page::Scanner))
      }
    }
  }

  async fn result(&mut self) -> Result<Option<Page>> {
    if let Some(scan) = self.session.last_scan() {
      print_result(&self.client, scan);
    }
    self
      .choose(&[("Scan again", Page::Scanner), ("Home", Page::Home)])
      .await
  }
}

fn print_result(client: &ApiClient, scan: &AnalyzeResponse) {
  let d = &scan.diagnosis;
  println!();
  println!("{}", d.disease.name);
  if let Some(sci) = &d.disease.scientific_name {
    println!("  ({sci})");
  }
  println!("  confidence: {:.0}%", d.disease.confidence * 100.0);
  println!("  severity:   {:?}", d.severity);
  println!("  healthy:    {}", if d.is_healthy { "yes" } else { "no" });
  println!("  image:      {}", client.asset_url(&scan.image_url));
  println!("\n{}", d.disease.description);
  println!("\nRecommendations:");
  for (i, r) in d.recommendations.iter().enumerate() {
    println!("  {}. {r}", i + 1);
  }
}
