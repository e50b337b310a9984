//! # Notara 웹 서버 진입점
//!
//! 이 파일은 저장 엔드포인트를 서빙하는 서버 바이너리의 **시작점(entry point)**입니다.
//! 도메인 로직은 모두 라이브러리 크레이트(`notara`)에 있고, 여기서는 조립만 합니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. API 라우터 설정
//! 5. HTTP 서버 시작

// ── 외부 크레이트 및 모듈에서 필요한 항목 가져오기 ──
use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::Router; // 라우터: URL 경로와 핸들러를 연결하는 구조체
use notara::{config::Config, db, routes}; // 라이브러리 크레이트의 설정, DB, 라우트 모듈
use tower_http::{
    // tower-http: HTTP 미들웨어 모음 크레이트
    cors::{Any, CorsLayer}, // CORS(Cross-Origin Resource Sharing) 설정
    trace::TraceLayer,      // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티

// #[tokio::main]: 비동기 런타임(Tokio)을 만들고 main을 그 안에서 실행하는 어트리뷰트 매크로
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .ok()로 Result를 Option으로 바꿔, .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // registry()에 필터와 포맷터를 레이어처럼 쌓아올립니다.
    tracing_subscriber::registry()
        .with(
            // RUST_LOG 환경변수가 없으면 notara, tower_http, axum 모듈을 debug 레벨로 설정
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notara=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer()) // 로그를 터미널에 출력하는 포맷터 레이어
        .init(); // 전역 로거로 등록

    // ── 3단계: 설정 로딩 ──
    // `?` 연산자: DATABASE_URL이 없으면 에러를 그대로 main 밖으로 전파합니다.
    let config = Config::from_env()?;
    tracing::info!("Starting Notara server on {}:{}", config.host, config.port);

    // ── 4단계: 연결 풀 생성과 마이그레이션 ──
    // db::connect()가 풀을 만들고 ./migrations의 스키마를 적용합니다.
    tracing::info!("Connecting to database and running migrations...");
    let pool = db::connect(&config.database_url).await?;

    // ── 5단계: 애플리케이션 상태(State) 생성 ──
    // SqlitePool은 내부적으로 Arc를 사용하므로 핸들러마다 복제해도 같은 풀을 가리킵니다.
    let state = routes::AppState {
        pool,
        max_content_bytes: config.max_content_bytes,
    };

    // ── 6단계: CORS 미들웨어 설정 ──
    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any) // 모든 출처(origin) 허용
        .allow_methods(Any) // 모든 HTTP 메서드 허용
        .allow_headers(Any); // 모든 헤더 허용

    // ── 7단계: 라우터 조립 ──
    // .nest(): API 라우트를 /api/v1 경로 아래에 중첩시킵니다.
    // 예: /documents → /api/v1/documents
    let app = Router::new()
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http()); // HTTP 요청/응답 자동 로깅

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    // TcpListener: 지정된 주소에 바인딩하여 TCP 연결을 수신 대기합니다.
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Ctrl+C로 종료할 때까지 요청을 처리합니다.
    axum::serve(listener, app).await?;

    Ok(())
}
