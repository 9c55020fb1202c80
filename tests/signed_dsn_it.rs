// self
use rds_iam_connector::{
	_preludet::*,
	config::ConnectorConfig,
	connector::Connector,
	dsn::{
		DsnBuilder, DsnFormat, DsnRequest, SignedDsnBuilder, SignedDsnError, TokenFuture,
		TokenRequest, TokenSigner,
	},
	error::ConnectError,
};

#[derive(Debug, ThisError)]
#[error("Credentials expired.")]
struct ExpiredCredentials;

/// Static access keys; `None` simulates an exhausted credential chain.
#[derive(Debug)]
struct AccessKeys(Option<&'static str>);

/// Signer stand-in producing deterministic, URL-ish tokens.
#[derive(Debug, Default)]
struct FakeSigner {
	seen: Mutex<Vec<String>>,
}
impl TokenSigner for FakeSigner {
	type Credentials = AccessKeys;
	type Error = ExpiredCredentials;

	fn sign<'a>(
		&'a self,
		request: TokenRequest<'a, Self::Credentials>,
	) -> TokenFuture<'a, Self::Error> {
		Box::pin(async move {
			self.seen.lock().push(format!("{}@{}", request.user, request.region));

			match request.credentials.0 {
				Some(key) => Ok(format!(
					"{}/?Action=connect&DBUser={}&X-Amz-Credential={key}",
					request.endpoint, request.user
				)),
				None => Err(ExpiredCredentials),
			}
		})
	}
}

fn params() -> BTreeMap<String, String> {
	BTreeMap::from_iter([("tls".to_owned(), "true".to_owned())])
}

#[tokio::test]
async fn tcp_dsn_embeds_signed_token_and_params() {
	let builder = SignedDsnBuilder::new(FakeSigner::default());
	let credentials = AccessKeys(Some("AKIDEXAMPLE"));
	let params = params();
	let dsn = builder
		.build(DsnRequest {
			endpoint: "billing.rds.local:3306",
			region: "us-west-2",
			user: "billing_app",
			db_name: "billing",
			credentials: &credentials,
			params: &params,
			format: DsnFormat::Tcp,
		})
		.await
		.expect("Signing with valid credentials should succeed.");

	assert_eq!(
		dsn.expose(),
		"billing_app:billing.rds.local:3306/?Action=connect&DBUser=billing_app&X-Amz-Credential=AKIDEXAMPLE@tcp(billing.rds.local:3306)/billing?tls=true"
	);
	assert_eq!(builder.signer().seen.lock().clone(), vec!["billing_app@us-west-2".to_owned()]);
}

#[tokio::test]
async fn empty_required_fields_are_rejected_before_signing() {
	let builder = SignedDsnBuilder::new(FakeSigner::default());
	let credentials = AccessKeys(Some("AKIDEXAMPLE"));
	let params = BTreeMap::new();
	let err = builder
		.build(DsnRequest {
			endpoint: "billing.rds.local:3306",
			region: " ",
			user: "billing_app",
			db_name: "billing",
			credentials: &credentials,
			params: &params,
			format: DsnFormat::Default,
		})
		.await
		.expect_err("Blank region should be rejected.");

	assert!(matches!(err, SignedDsnError::MissingField { field: "region" }));
	assert!(builder.signer().seen.lock().is_empty());
}

#[tokio::test]
async fn connector_wraps_signer_failures() {
	let config = ConnectorConfig::new(
		"billing.rds.local:3306",
		"us-west-2",
		"billing_app",
		"billing",
		AccessKeys(None),
	);
	let connector = <Connector<RecordingOpener, SignedDsnBuilder<FakeSigner>>>::new(
		config,
		SignedDsnBuilder::new(FakeSigner::default()),
		RecordingOpener::default(),
	);
	let err = connector.open("billing").await.expect_err("Expired credentials should surface.");

	assert!(matches!(err, ConnectError::BuildConnectionString { .. }));

	let builder_err =
		StdError::source(&err).expect("Wrapped error should expose the builder error.");

	assert_eq!(builder_err.to_string(), "Auth token could not be signed.");
	assert_eq!(
		builder_err.source().map(ToString::to_string),
		Some("Credentials expired.".to_owned())
	);
}

#[tokio::test]
async fn unconfigured_connector_surfaces_builder_error() {
	let config = ConnectorConfig::new("", "", "", "", AccessKeys(Some("AKIDEXAMPLE")));
	let connector = <Connector<RecordingOpener, SignedDsnBuilder<FakeSigner>>>::new(
		config,
		SignedDsnBuilder::new(FakeSigner::default()),
		RecordingOpener::default(),
	);
	let err = connector.open("anything").await.expect_err("Missing endpoint should surface.");
	let builder_err =
		StdError::source(&err).expect("Wrapped error should expose the builder error.");

	assert_eq!(builder_err.to_string(), "The endpoint field must not be empty.");
}
