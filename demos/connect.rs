//! Demonstrates a token-gated connector reusing one minted connection string across opens and
//! renewing it once the configured lifetime has passed.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
// self
use rds_iam_connector::{
	config::ConnectorSettings,
	connector::Connector,
	dsn::{SignedDsnBuilder, TokenFuture, TokenRequest, TokenSigner},
	opener::{OpenFuture, Opener},
};

/// Signer stand-in; a real deployment would presign an RDS `connect` request here.
struct DemoSigner {
	minted: AtomicUsize,
}
impl TokenSigner for DemoSigner {
	type Credentials = &'static str;
	type Error = std::io::Error;

	fn sign<'a>(
		&'a self,
		request: TokenRequest<'a, Self::Credentials>,
	) -> TokenFuture<'a, Self::Error> {
		Box::pin(async move {
			let n = self.minted.fetch_add(1, Ordering::Relaxed) + 1;

			Ok(format!("{}/?Action=connect&DBUser={}&demo-token={n}", request.endpoint, request.user))
		})
	}
}

/// Opener stand-in that hands the connection string back as the connection.
struct EchoOpener;
impl Opener for EchoOpener {
	type Connection = String;
	type Error = std::io::Error;

	fn open<'a>(&'a self, dsn: &'a str) -> OpenFuture<'a, Self::Connection, Self::Error> {
		Box::pin(async move { Ok(dsn.to_owned()) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = ConnectorSettings::from_json_str(
		r#"{
			"endpoint": "demo.cluster-abc.us-east-1.rds.amazonaws.com:3306",
			"region": "us-east-1",
			"user": "demo_app",
			"db_name": "demo",
			"params": { "tls": "rds", "allowCleartextPasswords": "true" },
			"token_lifetime_secs": 1
		}"#,
	)?;
	let signer = Arc::new(DemoSigner { minted: AtomicUsize::new(0) });
	let connector = <Connector<EchoOpener, SignedDsnBuilder<DemoSigner>>>::new(
		settings.into_config("demo-credentials")?,
		SignedDsnBuilder::new(signer.clone()),
		EchoOpener,
	);

	for attempt in 1..=3 {
		connector.open("demo").await?;

		println!(
			"Open #{attempt} succeeded; tokens minted so far: {}.",
			signer.minted.load(Ordering::Relaxed)
		);
	}

	tokio::time::sleep(std::time::Duration::from_millis(1_100)).await;
	connector.open("demo").await?;

	println!("Tokens minted: {}.", signer.minted.load(Ordering::Relaxed));

	Ok(())
}
