// LLM prompt constants for the extraction module.
//
// The tag grammar below is a wire contract shared with existing prompts:
// tag names, nesting, and the <ExperiencedSkill>/<YoE> adjacency must not
// change, or replies stop parsing.

/// System prompt for CV extraction — defines the full tag grammar and a
/// worked example of the expected output.
pub const CV_EXTRACTION_SYSTEM: &str = r#"Instruction: Parse the following CV texts (each of them are between <CV> and </CV> tags) and extract the following information in the following format (answer with no other text):
- Each parsed CV object should be in the <ParsedCV> and </ParsedCV> tags.
- The values in each parsed CV object should be kept in the original language of the CV.
- If a field is not present in the CV, it should be omitted from the output.
- The name of the applicant should be in the <ApplicationName> and </ApplicationName> tags.
- The email of the applicant should be in the <Email> and </Email> tags.
- The phone number of the applicant should be in the <Phone> and </Phone> tags.
- The LinkedIn profile URL of the applicant should be in the <LinkedIn> and </LinkedIn> tags.
- Total years of experience (work experience + projects) of the applicant should be in the <YearOfExperience> and </YearOfExperience> tags.
- The total years of experience should be calculated by summing the years of experience from work experiences and significant projects (such as internships, freelance work, college/university graduation projects,... etc.).
- The Git repository URL (like Github and GitLab) of the applicant should be in the <GitRepo> and </GitRepo> tags.
- The address (their home address or current working address) of the applicant should be in the <Address> and </Address> tags.
- Each work experience entry should be in the <WorkExperience> and </WorkExperience> tags.
- In each work experience entry, the company name should be in <Company> and </Company>, followed by the position held in <Position> and </Position> tags, start date between <StartDate> and </StartDate> tags,
end date (if applicable) between <EndDate> and </EndDate> tags, and description of the work experience in <Description> and </Description> tags.
- Each project entry should be in the <Project> and </Project> tags, in each project entry, the name of the project should be in <ProjectName> and </ProjectName> tags,
    followed by the description of the project in <Description> and </Description> tags, start date between <StartDate> and </StartDate> tags,
    end date (if applicable) between <EndDate> and </EndDate> tags.
- Each education entry should be in the <Education> and </Education> tags with the following fields:
    + Degree: in the <Degree> and </Degree> tags.
    + Institution: in the <Institution> and </Institution> tags.
    + Year: in the <Year> and </Year> tags.
    + GPA: in the <GPA> and </GPA> tags.
- Each skill entry should be in the <Skill> and </Skill> tags with all the text in that entry.
- For skills and job titles with experience (e.g. Spring Boot, embedded programming, project management,...), for each of them
should be in the <ExperiencedSkill> and <ExperiencedSkill> tags with corresponding years of experience in the <YoE> and </YoE> tag in the same line of that skill/job title.
If that skill doesn't have a work experience with time associated with it, parse it like other skill entries (wrap it in <Skill> and </Skill> tags) instead.
- Each certification entry should be in the <Certification> and </Certification> tags with all the text in that entry.

Example (do not parse this example, just use it as a reference for the output format):
<EXAMPLE_CV>
Name: John Doe  Email: johndoe@gmail.com  Phone: +1234567890
LinkedIn: https://www.linkedin.com/in/johndoe  Github: https://github.com/johndoe
Address: 123 Main St, City, Country
Work Experience:
ExpriLabs          2022-2024
- Developed AI models for natural language processing.
- Led a team of 5 engineers as a project manager.
TechCorp 2020-2022
- Worked on cloud computing solutions.
- Improved system performance by 30%.
Projects:
Detect Fraudulent Transactions using Machine Learning June 2019 - December 2019
- Developed a model to detect fraudulent transactions in real-time.
- Achieved 95% accuracy in detection.
Education:
Degree: Bachelor of Science in Computer Science    2016-2020
Institution: University of Technology, GPA: 3.8
Skills: Python, Machine Learning
Certifications: Certified Data Scientist
</EXAMPLE_CV>

The output should be in the following format:

<ParsedCV>
    <ApplicationName>John Doe</ApplicationName>
    <Email>johndoe@gmail.com</Email>
    <Phone>+1234567890</Phone>
    <LinkedIn>https://www.linkedin.com/in/johndoe</LinkedIn>
    <GitRepo>https://github.com/johndoe</GitRepo>
    <YearOfExperience>4</YearOfExperience>
    <Address>123 Main St, City, Country</Address>
    <WorkExperience>
        <Company>ExpriLabs</Company>
        <StartDate>2022</StartDate>
        <EndDate>2024</EndDate>
        <Position>Project Manager</Position>
        <Description>
        - Developed AI models for natural language processing.
        - Led a team of 5 engineers.
        </Description>
    </WorkExperience>
    <WorkExperience>
        <Company>TechCorp</Company>
        <StartDate>2020</StartDate>
        <EndDate>2022</EndDate>
        <Position>Cloud Engineer</Position>
        <Description>
        - Worked on cloud computing solutions.
        - Improved system performance by 30%.
        </Description>
    </WorkExperience>
    <Project>
        <ProjectName>Detect Fraudulent Transactions using Machine Learning</ProjectName>
        <StartDate>June 2019</StartDate>
        <EndDate>December 2019</EndDate>
        <Description>
        - Developed a model to detect fraudulent transactions in real-time.
        - Achieved 95% accuracy in detection.
        </Description>
    </Project>
    <Education>
        <Degree>Bachelor of Science in Computer Science</Degree>
        <Institution>University of Technology</Institution>
        <Year>2016-2020</Year>
        <GPA>3.8</GPA>
    </Education>
    <Skill>Python</Skill>
    <Skill>Machine Learning</Skill>
    <ExperiencedSkill>Cloud computing</ExperiencedSkill><YoE>2</YoE>
    <ExperiencedSkill>Project management</ExperiencedSkill><YoE>2</YoE>
    <Certification>Certified Data Scientist</Certification>
</ParsedCV>

End of instruction."#;

/// User prompt template. Replace `{cv_text}` with the `<CV>`-wrapped batch.
pub const CV_EXTRACTION_PROMPT_TEMPLATE: &str =
    "Now these are the CVs you need to parse:\n{cv_text}";
