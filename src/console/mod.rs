//! Interactive terminal front-end.
//!
//! Thin presentation layer over the session lifecycle manager and the API
//! client: login/register prompts, the converter screen, and the expiry
//! warning countdown. All timing decisions live in the session module;
//! this layer renders events and forwards the user's choices.

mod countdown;

pub use countdown::WarningCountdown;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::api::auth::VerifyOutcome;
use crate::api::ApiClient;
use crate::convert::ConverterForm;
use crate::models::session::LogoutReason;
use crate::screen::{self, Screen};
use crate::session::{SessionEvent, SessionLifecycleManager, SessionPolicy};
use crate::Result;

/// Run the interactive application until the user quits.
///
/// Performs the verify-on-load check, then drives the screen loop.
///
/// # Errors
///
/// Returns `AppError::Io` if reading stdin or writing stdout fails.
pub async fn run(api: Arc<ApiClient>, policy: SessionPolicy) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel(16);
    let manager = SessionLifecycleManager::new(Arc::clone(&api), policy, event_tx);

    // Verify-on-load: a valid stored credential skips the login screen.
    // The backend may omit the expiry, in which case the standard
    // extension window applies from now.
    match api.verify().await {
        VerifyOutcome::Valid { expires_at } => {
            let expires_at = expires_at.unwrap_or_else(|| Utc::now() + policy.extension_window);
            manager.login_success(expires_at);
        }
        VerifyOutcome::NotAuthenticated => debug!("no session credential on load"),
    }

    let console = Console {
        api,
        manager,
        events: event_rx,
        input: BufReader::new(tokio::io::stdin()).lines(),
    };
    console.run().await
}

/// What a screen handler decided comes next.
enum Flow {
    Goto(Screen),
    Quit,
}

/// Outcome of one converter-screen command line.
enum Command {
    Continue,
    Logout,
    Quit,
}

struct Console {
    api: Arc<ApiClient>,
    manager: SessionLifecycleManager,
    events: mpsc::Receiver<SessionEvent>,
    input: Lines<BufReader<Stdin>>,
}

impl Console {
    async fn run(mut self) -> Result<()> {
        let mut current = screen::resolve(Screen::default(), self.manager.is_authenticated());
        loop {
            let flow = match current {
                Screen::Login => self.login_screen().await?,
                Screen::Register => self.register_screen().await?,
                Screen::Converter => self.converter_screen().await?,
            };
            match flow {
                Flow::Goto(next) => {
                    current = screen::resolve(next, self.manager.is_authenticated());
                }
                Flow::Quit => break,
            }
        }

        // Close a live session on the way out.
        if self.manager.is_authenticated() {
            self.manager.logout(LogoutReason::UserRequested).await;
        }
        Ok(())
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush()?;
        Ok(self.input.next_line().await?)
    }

    async fn login_screen(&mut self) -> Result<Flow> {
        println!();
        println!("== Iniciar sesión ==");
        println!("('registro' crea una cuenta, 'terminar' sale)");
        loop {
            let Some(username) = self.prompt("Usuario: ").await? else {
                return Ok(Flow::Quit);
            };
            let username = username.trim().to_owned();
            match username.as_str() {
                "" => continue,
                "terminar" => return Ok(Flow::Quit),
                "registro" => return Ok(Flow::Goto(Screen::Register)),
                _ => {}
            }
            let Some(password) = self.prompt("Contraseña: ").await? else {
                return Ok(Flow::Quit);
            };

            match self.api.login(&username, password.trim()).await {
                Ok(expires_at) => {
                    self.manager.login_success(expires_at);
                    println!("Sesión iniciada.");
                    return Ok(Flow::Goto(Screen::Converter));
                }
                // The form stays editable; the user may retry.
                Err(err) => println!("Error: {err}"),
            }
        }
    }

    async fn register_screen(&mut self) -> Result<Flow> {
        println!();
        println!("== Crear cuenta ==");
        println!("(usuario vacío vuelve al inicio de sesión)");
        loop {
            let Some(username) = self.prompt("Usuario: ").await? else {
                return Ok(Flow::Quit);
            };
            let username = username.trim().to_owned();
            if username.is_empty() {
                return Ok(Flow::Goto(Screen::Login));
            }
            let Some(password) = self.prompt("Contraseña: ").await? else {
                return Ok(Flow::Quit);
            };

            match self.api.register(&username, password.trim()).await {
                Ok(()) => {
                    println!("¡Registro exitoso! Inicie sesión para continuar.");
                    return Ok(Flow::Goto(Screen::Login));
                }
                Err(err) => println!("Error: {err}"),
            }
        }
    }

    async fn converter_screen(&mut self) -> Result<Flow> {
        println!();
        println!("== Conversor de Quetzales a Dólares ==");

        let mut form = match self.api.daily_rate().await {
            Ok(rate) => {
                println!(
                    "Tipo de cambio del día ({}): 1 USD = {:.4} GTQ",
                    rate.fecha, rate.valor
                );
                ConverterForm::new(Some(rate))
            }
            Err(err) => {
                // Without a rate the conversion fields stay cleared.
                println!("Tipo de cambio no disponible: {err}");
                ConverterForm::new(None)
            }
        };
        println!("Comandos: q <monto> | d <monto> | salir | terminar");

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(SessionEvent::WarningDue { seconds_remaining }) => {
                        match self.warning_prompt(seconds_remaining).await? {
                            Flow::Quit => return Ok(Flow::Quit),
                            // Extended — stay on the converter.
                            Flow::Goto(Screen::Converter) => {}
                            flow @ Flow::Goto(_) => return Ok(flow),
                        }
                    }
                    Some(SessionEvent::LoggedOut { reason }) => {
                        println!("Sesión cerrada ({reason}).");
                        return Ok(Flow::Goto(Screen::Login));
                    }
                    Some(SessionEvent::Extended { .. }) | None => {}
                },
                line = self.input.next_line() => {
                    let Some(line) = line? else { return Ok(Flow::Quit); };
                    match handle_command(line.trim(), &mut form) {
                        Command::Continue => {}
                        Command::Logout => {
                            // The LoggedOut event arrives on the next turn
                            // of this loop and navigates to login.
                            self.manager.logout(LogoutReason::UserRequested).await;
                        }
                        Command::Quit => return Ok(Flow::Quit),
                    }
                }
            }
        }
    }

    /// Inline stand-in for the warning modal: a live countdown raced
    /// against the session event channel, so the scheduled logout
    /// interrupts the prompt even while the user hesitates.
    async fn warning_prompt(&mut self, seconds_remaining: u32) -> Result<Flow> {
        let mut countdown = WarningCountdown::new(seconds_remaining);
        println!();
        println!("¿Deseas seguir navegando?");
        println!(
            "La sesión se cierra en {} segundos.",
            countdown.seconds_remaining()
        );
        print!("[s = continuar / n = cerrar sesión] ");
        std::io::stdout().flush()?;

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    countdown.tick();
                    if !countdown.expired() {
                        print!("\r{} segundos restantes... [s/n] ", countdown.seconds_remaining());
                        std::io::stdout().flush()?;
                    }
                }
                event = self.events.recv() => match event {
                    Some(SessionEvent::LoggedOut { reason }) => {
                        println!();
                        println!("Sesión cerrada ({reason}).");
                        return Ok(Flow::Goto(Screen::Login));
                    }
                    Some(_) | None => {}
                },
                line = self.input.next_line() => {
                    let Some(line) = line? else { return Ok(Flow::Quit); };
                    match line.trim() {
                        "s" | "S" => match self.manager.extend().await {
                            Ok(expires_at) => {
                                println!("Sesión extendida hasta las {}.", expires_at.format("%H:%M:%S"));
                                return Ok(Flow::Goto(Screen::Converter));
                            }
                            Err(err) => {
                                // The forced logout already ran; its event
                                // lands on the next loop turn.
                                println!("No se pudo extender la sesión: {err}");
                            }
                        },
                        "n" | "N" => {
                            self.manager.logout(LogoutReason::UserRequested).await;
                        }
                        _ => {
                            print!("[s/n] ");
                            std::io::stdout().flush()?;
                        }
                    }
                }
            }
        }
    }
}

fn handle_command(line: &str, form: &mut ConverterForm) -> Command {
    if line.is_empty() {
        return Command::Continue;
    }
    if line == "salir" {
        return Command::Logout;
    }
    if line == "terminar" {
        return Command::Quit;
    }

    let (field, value) = match line.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (line, ""),
    };
    match field {
        "q" => {
            form.set_quetzales(value);
            print_form(form);
        }
        "d" => {
            form.set_dollars(value);
            print_form(form);
        }
        _ => println!("Comando no reconocido."),
    }
    Command::Continue
}

fn print_form(form: &ConverterForm) {
    let display = |field: &str| {
        if field.is_empty() {
            "—".to_owned()
        } else {
            field.to_owned()
        }
    };
    println!(
        "  GTQ: {:<12} USD: {}",
        display(form.quetzales()),
        display(form.dollars())
    );
}
