//! Subcommand handlers.

use anyhow::{Context as _, bail};
use urna_core::{
  AccountId, PersonId,
  identity::{NewPerson, Role},
  roster::{CandidateAttributes, NewCandidate, NewStudent},
  store::CredentialStore,
  vote::Category,
};
use urna_service::{
  IdentityService, PasswordHasher, Registration, RosterService, Session, StudentEnrollment,
  VotingService,
};
use urna_store_sqlite::SqliteStore;

use crate::{Command, Credentials, PersonArgs, read_password, settings::Settings};

pub struct App {
  store:    SqliteStore,
  identity: IdentityService<SqliteStore>,
  voting:   VotingService<SqliteStore, SqliteStore>,
  roster:   RosterService<SqliteStore>,
}

impl App {
  pub async fn open(settings: &Settings) -> anyhow::Result<Self> {
    let store = SqliteStore::open(&settings.database_path).await?;
    let hasher = PasswordHasher::new(&settings.hashing).context("invalid hashing settings")?;
    let limits = settings.limits.clone();

    Ok(Self {
      identity: IdentityService::new(store.clone(), hasher.clone(), limits.clone()),
      voting:   VotingService::new(store.clone(), store.clone(), limits.clone()),
      roster:   RosterService::new(store.clone(), hasher, limits),
      store,
    })
  }

  async fn login(&self, credentials: &Credentials) -> anyhow::Result<Session> {
    let Some(user) = &credentials.user else {
      bail!("this command needs --user (or URNA_USER)");
    };
    let password = password_or_prompt(credentials)?;
    Ok(self.identity.authenticate(user, &password).await?)
  }
}

fn password_or_prompt(credentials: &Credentials) -> anyhow::Result<String> {
  match &credentials.password {
    Some(password) => Ok(password.clone()),
    None => read_password("Password"),
  }
}

pub fn hash_password(settings: &Settings) -> anyhow::Result<()> {
  let password = read_password("Password")?;
  let hasher = PasswordHasher::new(&settings.hashing).context("invalid hashing settings")?;
  println!("{}", hasher.hash(&password)?);
  Ok(())
}

pub async fn run(app: &App, credentials: Credentials, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Init { admin } => init(app, admin, &credentials).await,
    Command::HashPassword => bail!("hash-password does not open the store"),

    Command::Register {
      username,
      new_password,
      role,
      forced_change,
      national_id,
      name,
      surname,
      age,
    } => {
      let person = match (national_id, name, surname, age) {
        (Some(national_id), Some(name), Some(surname), Some(age)) => {
          Some(NewPerson { national_id, name, surname, age })
        }
        (None, ..) => None,
        _ => bail!("--national-id needs --name, --surname, and --age"),
      };
      let session = if credentials.user.is_some() {
        Some(app.login(&credentials).await?)
      } else {
        None
      };
      let password = match new_password {
        Some(password) => password,
        None => read_password("New account password")?,
      };
      let id = app
        .identity
        .register(session.as_ref(), Registration {
          username,
          password,
          role,
          forced_change,
          person,
        })
        .await?;
      println!("registered account {id}");
      Ok(())
    }

    Command::Login => {
      let session = app.login(&credentials).await?;
      println!(
        "session {} for {} ({}) started {}",
        session.session_id(),
        session.username(),
        session.role().name,
        session.started_at().format("%Y-%m-%d %H:%M:%S UTC"),
      );
      if session.password_change_required() {
        println!("temporary password: run `urna first-login --new <PASSWORD>`");
      }
      Ok(())
    }

    Command::ChangePassword { new } => {
      let Some(user) = &credentials.user else {
        bail!("this command needs --user (or URNA_USER)");
      };
      let current = password_or_prompt(&credentials)?;
      let account = app
        .store
        .find_account(user)
        .await?
        .map(|a| a.account_id);
      // An unknown user is reported the same way as a wrong password.
      let Some(account) = account else {
        return Err(urna_core::Error::InvalidCredentials.into());
      };
      app.identity.change_password(account, &current, &new).await?;
      println!("password changed");
      Ok(())
    }

    Command::FirstLogin { new } => {
      let session = app.login(&credentials).await?;
      app
        .identity
        .change_password_first_login(&session, &new)
        .await?;
      println!("password changed; log in again with the new password");
      Ok(())
    }

    Command::Enroll { person, program, enrollment_id, username } => {
      let admin = app.login(&credentials).await?;
      let PersonArgs { national_id, name, surname, age } = person;
      let enrolled = app
        .roster
        .enroll_student(&admin, StudentEnrollment {
          username,
          person: NewPerson { national_id, name, surname, age },
          student: NewStudent { program, enrollment_id },
        })
        .await?;
      match enrolled.account_id {
        Some(account) => println!("enrolled student {} with account {account}", enrolled.student_id),
        None => println!("enrolled student {}", enrolled.student_id),
      }
      Ok(())
    }

    Command::Nominate { student_id, category, photo, interests, talents, goals } => {
      let admin = app.login(&credentials).await?;
      let candidate = app
        .roster
        .nominate(&admin, NewCandidate {
          student_id: PersonId(student_id),
          category:   Category::new(category),
          photo_path: photo,
          attributes: CandidateAttributes { interests, talents, goals },
        })
        .await?;
      println!("nominated candidate {} in {}", candidate.candidate_id(), candidate.category);
      Ok(())
    }

    Command::SetCandidateActive { candidate_id, active } => {
      let admin = app.login(&credentials).await?;
      app
        .roster
        .set_candidate_active(&admin, PersonId(candidate_id), active)
        .await?;
      println!("candidate {candidate_id} active={active}");
      Ok(())
    }

    Command::SetAccountActive { account_id, active } => {
      let admin = app.login(&credentials).await?;
      app
        .identity
        .set_account_active(&admin, AccountId(account_id), active)
        .await?;
      println!("account {account_id} active={active}");
      Ok(())
    }

    Command::ResetPassword { account_id, temporary } => {
      let admin = app.login(&credentials).await?;
      app
        .identity
        .reset_password(&admin, AccountId(account_id), &temporary)
        .await?;
      println!("account {account_id} must change its password at next login");
      Ok(())
    }

    Command::Ballot { category } => {
      for candidate in app.voting.ballot(Category::new(category)).await? {
        let person = &candidate.student.person;
        println!("{:>6}  {} {}", candidate.candidate_id(), person.name, person.surname);
      }
      Ok(())
    }

    Command::Vote { candidate_id, category } => {
      let voter = app.login(&credentials).await?;
      let vote = app
        .voting
        .cast_vote(&voter, PersonId(candidate_id), Category::new(category))
        .await?;
      println!("vote {} recorded for candidate {} in {}", vote.vote_id, vote.candidate_id, vote.category);
      Ok(())
    }

    Command::History => {
      let voter = app.login(&credentials).await?;
      for vote in app.voting.history(&voter).await? {
        println!(
          "{}  {:<20} candidate {}",
          vote.cast_at.format("%Y-%m-%d %H:%M:%S"),
          vote.category.as_str(),
          vote.candidate_id
        );
      }
      Ok(())
    }
  }
}

async fn init(app: &App, admin: Option<String>, credentials: &Credentials) -> anyhow::Result<()> {
  for name in [Role::ADMIN, Role::STUDENT] {
    if app.store.find_role(name).await?.is_none() {
      let role = app.store.add_role(name.into()).await?;
      tracing::info!(role = %role.name, role_id = %role.role_id, "seeded role");
    }
  }

  if let Some(username) = admin {
    let password = password_or_prompt(credentials)?;
    match app.identity.bootstrap_admin(&username, &password).await {
      Ok(id) => println!("created administrator {username} (account {id})"),
      Err(urna_core::Error::AdminAlreadyExists) => {
        println!("an administrator already exists; {username} was not created")
      }
      Err(err) => return Err(err.into()),
    }
  }

  for role in app.store.list_roles().await? {
    println!("role {:>3}  {}", role.role_id.0, role.name);
  }
  println!("database ready");
  Ok(())
}
